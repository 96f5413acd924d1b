use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Invalid keypair file {path}: {reason}")]
    InvalidKeypairFile { path: String, reason: String },

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

impl From<chain_sol::SolError> for WalletError {
    fn from(e: chain_sol::SolError) -> Self {
        WalletError::SigningFailed(e.to_string())
    }
}
