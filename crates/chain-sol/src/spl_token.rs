//! SPL Token instruction factories for Solana.
//!
//! Implements the SPL Token instructions the token page issues, plus
//! associated token account (ATA) address derivation and creation, without
//! pulling in the `solana-sdk` or the `spl-token` crates.

use sha2::{Digest, Sha256};

use crate::address::{is_on_curve, Pubkey};
use crate::error::SolError;
use crate::system::{SYSTEM_PROGRAM_ID, SYSVAR_RENT_ID};
use crate::transaction::{AccountMeta, Instruction};

// ---------------------------------------------------------------------------
// Well-known program IDs and account sizes
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
]);

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

/// Size of a packed `Mint` account.
pub const MINT_SIZE: u64 = 82;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// SPL Token instruction tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum TokenInstruction {
    InitializeMint = 0,
    Transfer = 3,
    Approve = 4,
    MintToChecked = 14,
    BurnChecked = 15,
}

/// Associated Token Account program `CreateIdempotent` tag.
const ATA_CREATE_IDEMPOTENT: u8 = 1;

fn amount_data(tag: TokenInstruction, amount: u64, decimals: Option<u8>) -> Vec<u8> {
    let mut data = Vec::with_capacity(10);
    data.push(tag as u8);
    data.extend_from_slice(&amount.to_le_bytes());
    if let Some(decimals) = decimals {
        data.push(decimals);
    }
    data
}

fn non_zero(amount: u64, what: &'static str) -> Result<(), SolError> {
    if amount == 0 {
        return Err(SolError::ZeroAmount(what));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mint setup
// ---------------------------------------------------------------------------

/// Build an SPL Token `InitializeMint` instruction.
///
/// The mint account must already exist with `MINT_SIZE` bytes and be owned
/// by the Token Program (see [`crate::system::create_account`]).
///
/// # Wire format
///
/// `[0, decimals, mint_authority(32), freeze_tag, freeze_authority(32)?]`,
/// 35 bytes without a freeze authority, 67 with one.
pub fn initialize_mint(
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
) -> Instruction {
    let mut data = Vec::with_capacity(67);
    data.push(TokenInstruction::InitializeMint as u8);
    data.push(decimals);
    data.extend_from_slice(mint_authority.as_bytes());
    match freeze_authority {
        Some(freeze) => {
            data.push(1);
            data.extend_from_slice(freeze.as_bytes());
        }
        None => data.push(0),
    }

    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*mint, false),
            AccountMeta::new_readonly(SYSVAR_RENT_ID, false),
        ],
        data,
    }
}

// ---------------------------------------------------------------------------
// Token movement
// ---------------------------------------------------------------------------

/// Build an SPL Token `Transfer` instruction.
///
/// Moves `amount` base units (for a token with 9 decimals, `amount =
/// 1_000_000_000` is 1 whole token) from `source` to `destination`. Both are
/// token accounts; `owner` owns `source` and signs.
///
/// # Wire format
///
/// SPL Token `Transfer` instruction index = 3, followed by u64 LE amount.
/// Total data: 9 bytes.
pub fn transfer(
    source: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Result<Instruction, SolError> {
    non_zero(amount, "transfer")?;

    Ok(Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: amount_data(TokenInstruction::Transfer, amount, None),
    })
}

/// Build an SPL Token `MintToChecked` instruction.
///
/// The program rejects the instruction unless `decimals` matches the mint.
/// Data: `[14, amount u64 LE, decimals]`, 10 bytes.
pub fn mint_to_checked(
    mint: &Pubkey,
    destination: &Pubkey,
    mint_authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, SolError> {
    non_zero(amount, "mint")?;

    Ok(Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*mint, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*mint_authority, true),
        ],
        data: amount_data(TokenInstruction::MintToChecked, amount, Some(decimals)),
    })
}

/// Build an SPL Token `BurnChecked` instruction.
///
/// Data: `[15, amount u64 LE, decimals]`, 10 bytes.
pub fn burn_checked(
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, SolError> {
    non_zero(amount, "burn")?;

    Ok(Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*account, false),
            AccountMeta::new(*mint, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: amount_data(TokenInstruction::BurnChecked, amount, Some(decimals)),
    })
}

/// Build an SPL Token `Approve` instruction letting `delegate` move up to
/// `amount` base units out of `source`.
pub fn approve(source: &Pubkey, delegate: &Pubkey, owner: &Pubkey, amount: u64) -> Instruction {
    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(*delegate, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: amount_data(TokenInstruction::Approve, amount, None),
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account (PDA) derivation
// ---------------------------------------------------------------------------

/// Derive the associated token account address for a wallet + mint pair.
///
/// The ATA is a Program Derived Address (PDA) with seeds
/// `[wallet_address, token_program_id, mint_address]` derived from the
/// Associated Token Account program.
pub fn derive_associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey, SolError> {
    find_program_address(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Build an Associated Token Account `CreateIdempotent` instruction.
///
/// Creates the ATA for (`wallet`, `mint`) funded by `payer`, or does nothing
/// if it already exists.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction, SolError> {
    let ata = derive_associated_token_address(wallet, mint)?;

    Ok(Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*wallet, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: vec![ATA_CREATE_IDEMPOTENT],
    })
}

/// Find a valid Program Derived Address (PDA) for the given seeds and program.
///
/// Iterates bump seeds from 255 down to 0, computing
/// `SHA-256(seed_0 || seed_1 || ... || bump || program_id || "ProgramDerivedAddress")`
/// and returning the first result that is NOT a valid Ed25519 point.
fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), SolError> {
    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(SolError::NoProgramAddress)
}

/// Returns `Some(address)` if the derived point is off the Ed25519 curve,
/// `None` if it falls on the curve (try the next bump).
fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &Pubkey,
) -> Option<Pubkey> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(Pubkey::new_from_array(hash))
}
