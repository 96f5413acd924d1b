use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("RPC error {0}: {1}")]
    Rpc(i64, String),

    /// Built only through `From`, which drops the request URL (and with
    /// it any `api-key` query value).
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Transaction {signature} not confirmed within {secs}s")]
    ConfirmationTimeout { signature: String, secs: u64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.without_url())
    }
}

impl RpcError {
    pub fn http(status: u16) -> Self {
        let message = match status {
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Unknown Error",
        };
        Self::Http(status, message.to_string())
    }
}
