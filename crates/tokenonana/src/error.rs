use chain_sol::SolError;
use sol_rpc::RpcError;
use thiserror::Error;
use wallet_adapter::WalletError;

/// Why a handler refused to run or could not assemble its transaction.
/// Every variant is logged before it is returned.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Missing input field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidAmount { field: &'static str, reason: String },

    #[error("Invalid {field} address: {reason}")]
    InvalidAddress { field: &'static str, reason: String },

    #[error("Invalid {0} address: not on the ed25519 curve")]
    OffCurve(&'static str),

    #[error("No mint selected; create a token or configure a mint first")]
    MintNotSet,

    #[error("Failed to build transaction: {0}")]
    Build(#[from] SolError),
}

/// Failures between handing a transaction to the wallet and its
/// confirmation. The submission helper logs these and returns `None`.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Transaction(#[from] SolError),
}
