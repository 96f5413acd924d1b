use thiserror::Error;

use crate::address::Pubkey;

/// Errors from building, signing, or encoding Solana transactions.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("no viable bump seed for program address")]
    NoProgramAddress,

    #[error("{0} amount must be greater than zero")]
    ZeroAmount(&'static str),

    #[error("a transaction needs at least one instruction")]
    EmptyMessage,

    #[error("message compilation failed: {0}")]
    Compile(String),

    #[error("{0} is not a required signer")]
    UnknownSigner(Pubkey),

    #[error("missing signature for {0}")]
    MissingSignature(Pubkey),

    #[error("transaction is {size} bytes, limit is {limit}")]
    PacketTooLarge { size: usize, limit: usize },
}
