//! Solana primitives for the token page.
//!
//! Public keys, ed25519 keypairs, the legacy transaction wire format, and the
//! System Program and SPL Token instructions the page issues. Encoding is
//! done here by hand over `ed25519-dalek`, `curve25519-dalek`, `sha2` and
//! `bs58` rather than through `solana-sdk`.

pub mod address;
pub mod error;
pub mod keypair;
pub mod spl_token;
pub mod system;
pub mod transaction;

pub use address::{is_on_curve, Pubkey};
pub use error::SolError;
pub use keypair::{Keypair, Signature, Signer};
pub use spl_token::{
    derive_associated_token_address, ASSOCIATED_TOKEN_PROGRAM_ID, MINT_SIZE, TOKEN_PROGRAM_ID,
};
pub use system::SYSTEM_PROGRAM_ID;
pub use transaction::{AccountMeta, CompiledInstruction, Instruction, Message, Transaction};
