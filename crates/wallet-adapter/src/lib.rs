//! # wallet-adapter
//!
//! The wallet side of the token page: who is connected and how their
//! transactions get signed. `LocalWallet` loads its key from a Solana CLI
//! keypair file or derives it from a BIP-39 mnemonic.

pub mod adapter;
pub mod derivation;
pub mod error;
pub mod keypair_file;

pub use adapter::{LocalWallet, WalletAdapter};
pub use error::WalletError;
