//! Manual Solana transaction wire format and signing.
//!
//! We build legacy Solana transactions entirely by hand, no `solana-sdk`
//! dependency. The wire format is a compact binary layout documented here:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use crate::address::Pubkey;
use crate::error::SolError;
use crate::keypair::{Signature, Signer};

/// Largest serialized transaction a validator accepts (IPv6 MTU minus headers).
pub const PACKET_DATA_SIZE: usize = 1232;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

fn compact_len(len: usize, what: &str) -> Result<Vec<u8>, SolError> {
    let len = u16::try_from(len)
        .map_err(|_| SolError::Compile(format!("too many {what}: {len}")))?;
    Ok(encode_compact_u16(len))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account.
    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A Solana instruction (before it is compiled into a message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the message's `account_keys` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    /// Index into `account_keys` for the program to invoke.
    pub program_id_index: u8,
    /// Indices into `account_keys` for each account the instruction reads/writes.
    pub account_indices: Vec<u8>,
    /// Opaque instruction data.
    pub data: Vec<u8>,
}

/// The signed portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,

    /// All account keys referenced by this message, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Pubkey>,

    /// Recent blockhash (32 bytes). Zero until the sender fills it in.
    pub recent_blockhash: [u8; 32],

    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile instructions into a message with a single fee payer.
    ///
    /// The fee payer is always the first signer and is placed at index 0 in
    /// the account keys.
    pub fn new(instructions: &[Instruction], fee_payer: &Pubkey) -> Result<Self, SolError> {
        if instructions.is_empty() {
            return Err(SolError::EmptyMessage);
        }

        // Instruction account lists are tiny, a Vec beats a map here.
        struct AccountEntry {
            pubkey: Pubkey,
            is_signer: bool,
            is_writable: bool,
        }

        let mut entries: Vec<AccountEntry> = Vec::new();

        let mut upsert = |pubkey: Pubkey, signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(AccountEntry {
                    pubkey,
                    is_signer: signer,
                    is_writable: writable,
                });
            }
        };

        // Fee payer is always signer + writable.
        upsert(*fee_payer, true, true);

        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            // Program IDs are non-signer, read-only accounts.
            upsert(ix.program_id, false, false);
        }

        // Stable sort: within a category insertion order is kept, so the fee
        // payer stays ahead of the other writable signers.
        entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
            (true, true) => 0u8,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        if entries.len() > usize::from(u8::MAX) + 1 {
            return Err(SolError::Compile(format!(
                "too many accounts: {}",
                entries.len()
            )));
        }

        let num_signers = entries.iter().filter(|e| e.is_signer).count() as u8;
        let num_readonly_signed = entries
            .iter()
            .filter(|e| e.is_signer && !e.is_writable)
            .count() as u8;
        let num_readonly_unsigned = entries
            .iter()
            .filter(|e| !e.is_signer && !e.is_writable)
            .count() as u8;

        let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();

        let index_of = |key: &Pubkey| -> Result<u8, SolError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| SolError::Compile(format!("{key} not in account keys")))
        };

        let mut compiled = Vec::with_capacity(instructions.len());
        for ix in instructions {
            let program_id_index = index_of(&ix.program_id)?;
            let account_indices = ix
                .accounts
                .iter()
                .map(|meta| index_of(&meta.pubkey))
                .collect::<Result<Vec<u8>, SolError>>()?;

            compiled.push(CompiledInstruction {
                program_id_index,
                account_indices,
                data: ix.data.clone(),
            });
        }

        Ok(Self {
            num_required_signatures: num_signers,
            num_readonly_signed,
            num_readonly_unsigned,
            account_keys,
            recent_blockhash: [0u8; 32],
            instructions: compiled,
        })
    }

    pub fn fee_payer(&self) -> &Pubkey {
        &self.account_keys[0]
    }

    /// The accounts whose signatures this message requires, in slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        &self.account_keys[..self.num_required_signatures as usize]
    }

    /// Serialize the message (the bytes that get signed).
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let mut buf = Vec::with_capacity(256);

        // Header: 3 bytes.
        buf.push(self.num_required_signatures);
        buf.push(self.num_readonly_signed);
        buf.push(self.num_readonly_unsigned);

        buf.extend_from_slice(&compact_len(self.account_keys.len(), "account keys")?);
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&compact_len(self.instructions.len(), "instructions")?);
        for ix in &self.instructions {
            buf.push(ix.program_id_index);

            buf.extend_from_slice(&compact_len(ix.account_indices.len(), "instruction accounts")?);
            buf.extend_from_slice(&ix.account_indices);

            buf.extend_from_slice(&compact_len(ix.data.len(), "instruction data bytes")?);
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }
}

/// A legacy Solana transaction: one signature slot per required signer
/// followed by the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    pub fn new_unsigned(message: Message) -> Self {
        let slots = message.num_required_signatures as usize;
        Self {
            signatures: vec![Signature::unsigned(); slots],
            message,
        }
    }

    /// Compile `instructions` with `payer` as fee payer into an unsigned
    /// transaction.
    pub fn new_with_payer(instructions: &[Instruction], payer: &Pubkey) -> Result<Self, SolError> {
        Message::new(instructions, payer).map(Self::new_unsigned)
    }

    /// Replace the recent blockhash. Existing signatures no longer cover the
    /// message and are cleared.
    pub fn set_recent_blockhash(&mut self, blockhash: [u8; 32]) {
        if self.message.recent_blockhash != blockhash {
            self.message.recent_blockhash = blockhash;
            self.signatures.fill(Signature::unsigned());
        }
    }

    /// Sign with every signer given, leaving other slots untouched.
    ///
    /// Each signer must be one of the message's required signers.
    pub fn partial_sign(&mut self, signers: &[&dyn Signer]) -> Result<(), SolError> {
        let message = self.message.serialize()?;

        for signer in signers {
            let pubkey = signer.pubkey();
            let slot = self
                .message
                .signer_keys()
                .iter()
                .position(|k| *k == pubkey)
                .ok_or(SolError::UnknownSigner(pubkey))?;

            self.signatures[slot] = signer.try_sign_message(&message)?;
        }

        Ok(())
    }

    /// Whether every required signature slot is filled.
    pub fn is_signed(&self) -> bool {
        self.signatures.iter().all(|s| !s.is_unsigned())
    }

    /// The fee payer's signature, which doubles as the transaction id.
    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first().filter(|s| !s.is_unsigned())
    }

    /// Serialize a fully signed transaction into its wire format.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        if let Some(missing) = self
            .signatures
            .iter()
            .zip(self.message.signer_keys())
            .find(|(sig, _)| sig.is_unsigned())
            .map(|(_, key)| *key)
        {
            return Err(SolError::MissingSignature(missing));
        }

        let message = self.message.serialize()?;

        let mut wire = Vec::with_capacity(3 + 64 * self.signatures.len() + message.len());
        wire.extend_from_slice(&compact_len(self.signatures.len(), "signatures")?);
        for signature in &self.signatures {
            wire.extend_from_slice(signature.as_bytes());
        }
        wire.extend_from_slice(&message);

        if wire.len() > PACKET_DATA_SIZE {
            return Err(SolError::PacketTooLarge {
                size: wire.len(),
                limit: PACKET_DATA_SIZE,
            });
        }

        Ok(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::Keypair;
    use crate::system;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    fn noop(program: Pubkey, accounts: Vec<AccountMeta>) -> Instruction {
        Instruction {
            program_id: program,
            accounts,
            data: vec![1, 2, 3],
        }
    }

    // -- compact-u16 encoding -----------------------------------------------

    #[test]
    fn compact_u16_zero() {
        assert_eq!(encode_compact_u16(0), vec![0x00]);
    }

    #[test]
    fn compact_u16_one_byte_max() {
        assert_eq!(encode_compact_u16(0x7f), vec![0x7f]);
    }

    #[test]
    fn compact_u16_boundary_128() {
        // 128 = 0x80 -> two bytes: (0x00 | 0x80), 0x01
        assert_eq!(encode_compact_u16(128), vec![0x80, 0x01]);
    }

    #[test]
    fn compact_u16_boundary_16384() {
        assert_eq!(encode_compact_u16(16384), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn compact_u16_max_value() {
        assert_eq!(encode_compact_u16(u16::MAX), vec![0xff, 0xff, 0x03]);
    }

    // -- Message compilation ------------------------------------------------

    #[test]
    fn empty_instruction_list_fails() {
        assert!(matches!(Message::new(&[], &key(1)), Err(SolError::EmptyMessage)));
    }

    #[test]
    fn account_order_and_header() {
        let payer = key(1);
        let extra_signer = key(2);
        let writable = key(3);
        let readonly = key(4);
        let program = key(5);

        let ix = noop(
            program,
            vec![
                AccountMeta::new_readonly(readonly, false),
                AccountMeta::new(writable, false),
                AccountMeta::new(extra_signer, true),
            ],
        );
        let message = Message::new(&[ix], &payer).unwrap();

        assert_eq!(
            message.account_keys,
            vec![payer, extra_signer, writable, readonly, program]
        );
        assert_eq!(message.num_required_signatures, 2);
        assert_eq!(message.num_readonly_signed, 0);
        assert_eq!(message.num_readonly_unsigned, 2);
        assert_eq!(message.signer_keys(), &[payer, extra_signer]);
        assert_eq!(message.fee_payer(), &payer);
    }

    #[test]
    fn duplicate_accounts_merge_permissions() {
        let payer = key(1);
        let shared = key(2);
        let program = key(9);

        let first = noop(program, vec![AccountMeta::new_readonly(shared, false)]);
        let second = noop(program, vec![AccountMeta::new(shared, false)]);
        let message = Message::new(&[first, second], &payer).unwrap();

        // payer, shared (now writable), program.
        assert_eq!(message.account_keys.len(), 3);
        assert_eq!(message.account_keys[1], shared);
        assert_eq!(message.num_readonly_unsigned, 1);
    }

    #[test]
    fn compiled_instruction_indices() {
        let payer = key(1);
        let target = key(2);
        let ix = system::create_account(&payer, &target, 10, 82, &key(7));
        let message = Message::new(&[ix], &payer).unwrap();

        let cix = &message.instructions[0];
        let position = |k: &Pubkey| message.account_keys.iter().position(|x| x == k).unwrap() as u8;
        assert_eq!(cix.program_id_index, position(&system::SYSTEM_PROGRAM_ID));
        assert_eq!(cix.account_indices, vec![position(&payer), position(&target)]);
    }

    #[test]
    fn serialize_message_layout() {
        let payer = key(1);
        let ix = noop(key(2), vec![]);
        let mut message = Message::new(&[ix], &payer).unwrap();
        message.recent_blockhash = [0xCC; 32];
        let bytes = message.serialize().unwrap();

        assert_eq!(&bytes[..3], &[1, 0, 1]);
        assert_eq!(bytes[3], 2); // two account keys
        let offset = 4 + 32 * 2;
        assert_eq!(&bytes[offset..offset + 32], &[0xCC; 32]);
        // one instruction: program index 1, zero accounts, 3 data bytes.
        assert_eq!(&bytes[offset + 32..], &[1, 1, 0, 3, 1, 2, 3]);
    }

    // -- Signing ------------------------------------------------------------

    #[test]
    fn partial_sign_fills_each_slot() {
        use ed25519_dalek::{Verifier, VerifyingKey};

        let payer = Keypair::from_seed(&[0x42u8; 32]);
        let mint = Keypair::from_seed(&[0x43u8; 32]);
        let ix = system::create_account(&payer.pubkey(), &mint.pubkey(), 1, 82, &key(7));

        let mut tx = Transaction::new_with_payer(&[ix], &payer.pubkey()).unwrap();
        tx.set_recent_blockhash([0xAB; 32]);
        assert_eq!(tx.signatures.len(), 2);

        tx.partial_sign(&[&mint]).unwrap();
        assert!(!tx.is_signed());
        assert!(tx.signature().is_none());

        tx.partial_sign(&[&payer]).unwrap();
        assert!(tx.is_signed());

        let message = tx.message.serialize().unwrap();
        for (signature, signer) in tx.signatures.iter().zip(tx.message.signer_keys()) {
            let vk = VerifyingKey::from_bytes(signer.as_bytes()).unwrap();
            let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
            assert!(vk.verify(&message, &sig).is_ok());
        }
    }

    #[test]
    fn foreign_signer_is_rejected() {
        let payer = Keypair::from_seed(&[1u8; 32]);
        let stranger = Keypair::from_seed(&[2u8; 32]);
        let mut tx = Transaction::new_with_payer(&[noop(key(9), vec![])], &payer.pubkey()).unwrap();

        let err = tx.partial_sign(&[&stranger]).unwrap_err();
        assert!(matches!(err, SolError::UnknownSigner(k) if k == stranger.pubkey()));
    }

    #[test]
    fn new_blockhash_clears_signatures() {
        let payer = Keypair::from_seed(&[1u8; 32]);
        let mut tx = Transaction::new_with_payer(&[noop(key(9), vec![])], &payer.pubkey()).unwrap();
        tx.set_recent_blockhash([1; 32]);
        tx.partial_sign(&[&payer]).unwrap();
        assert!(tx.is_signed());

        tx.set_recent_blockhash([1; 32]);
        assert!(tx.is_signed());

        tx.set_recent_blockhash([2; 32]);
        assert!(!tx.is_signed());
    }

    #[test]
    fn serialize_requires_all_signatures() {
        let payer = Keypair::from_seed(&[1u8; 32]);
        let tx = Transaction::new_with_payer(&[noop(key(9), vec![])], &payer.pubkey()).unwrap();
        let err = tx.serialize().unwrap_err();
        assert!(matches!(err, SolError::MissingSignature(k) if k == payer.pubkey()));
    }

    #[test]
    fn serialize_wire_layout() {
        let payer = Keypair::from_seed(&[0x55u8; 32]);
        let mut tx = Transaction::new_with_payer(&[noop(key(9), vec![])], &payer.pubkey()).unwrap();
        tx.set_recent_blockhash([0x99; 32]);
        tx.partial_sign(&[&payer]).unwrap();

        let wire = tx.serialize().unwrap();
        assert_eq!(wire[0], 0x01);
        assert_eq!(&wire[1..65], tx.signatures[0].as_bytes());
        assert_eq!(&wire[65..], tx.message.serialize().unwrap().as_slice());
        assert_eq!(tx.signature(), Some(&tx.signatures[0]));
    }

    #[test]
    fn oversized_transaction_is_rejected() {
        let payer = Keypair::from_seed(&[3u8; 32]);
        let ix = Instruction {
            program_id: key(9),
            accounts: vec![],
            data: vec![0u8; PACKET_DATA_SIZE],
        };
        let mut tx = Transaction::new_with_payer(&[ix], &payer.pubkey()).unwrap();
        tx.partial_sign(&[&payer]).unwrap();
        assert!(matches!(
            tx.serialize(),
            Err(SolError::PacketTooLarge { limit: PACKET_DATA_SIZE, .. })
        ));
    }
}
