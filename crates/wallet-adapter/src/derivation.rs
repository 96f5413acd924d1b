//! Mnemonic wallets: BIP-39 phrase to seed, then SLIP-0010 ed25519
//! derivation along Solana's `m/44'/501'/{account}'/0'`.

use bip39::{Language, Mnemonic};
use chain_sol::Keypair;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::WalletError;

type HmacSha512 = Hmac<Sha512>;

const HARDENED: u32 = 0x8000_0000;
const PURPOSE: u32 = 44;
const SOLANA_COIN_TYPE: u32 = 501;

/// The path `solana-keygen` and browser wallets use for `account`.
pub fn solana_derivation_path(account: u32) -> String {
    format!("m/{PURPOSE}'/{SOLANA_COIN_TYPE}'/{account}'/0'")
}

/// The 64-byte BIP-39 seed, wiped on drop.
pub fn seed_from_phrase(
    phrase: &str,
    passphrase: &str,
) -> Result<Zeroizing<[u8; 64]>, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_seed(passphrase)))
}

/// One SLIP-0010 node. Ed25519 only supports hardened children.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Node {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl Node {
    fn from_hmac(hmac_key: &[u8], parts: &[&[u8]]) -> Result<Self, WalletError> {
        let mut mac = HmacSha512::new_from_slice(hmac_key)
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
        for part in parts {
            mac.update(part);
        }
        let mut out = mac.finalize().into_bytes();

        let mut node = Node {
            key: [0u8; 32],
            chain_code: [0u8; 32],
        };
        node.key.copy_from_slice(&out[..32]);
        node.chain_code.copy_from_slice(&out[32..]);
        out.zeroize();
        Ok(node)
    }

    fn master(seed: &[u8]) -> Result<Self, WalletError> {
        Self::from_hmac(b"ed25519 seed", &[seed])
    }

    fn hardened_child(&self, index: u32) -> Result<Self, WalletError> {
        let index = (index | HARDENED).to_be_bytes();
        Self::from_hmac(&self.chain_code, &[&[0x00], &self.key, &index])
    }
}

/// Derive the Solana keypair for `account` from a BIP-39 seed.
pub fn derive_keypair(seed: &[u8], account: u32) -> Result<Keypair, WalletError> {
    let mut node = Node::master(seed)?;
    for index in [PURPOSE, SOLANA_COIN_TYPE, account, 0] {
        node = node.hardened_child(index)?;
    }
    Ok(Keypair::from_seed(&node.key))
}
