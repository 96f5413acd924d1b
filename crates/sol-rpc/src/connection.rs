//! The `Connection` seam between the page and the RPC node, plus the
//! confirmation loop built on top of it.

use std::time::Duration;

use async_trait::async_trait;
use chain_sol::Signature;
use tokio::time::{sleep, Instant};

use crate::commitment::{CommitmentLevel, SignatureStatus};
use crate::error::RpcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: [u8; 32],
    pub last_valid_block_height: u64,
}

/// The RPC methods the token page relies on.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError>;

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: u64) -> Result<u64, RpcError>;

    /// Submit a signed, serialized transaction. Returns the signature the
    /// node reports.
    async fn send_transaction(&self, wire: &[u8]) -> Result<Signature, RpcError>;

    /// `None` while the node has not seen the signature.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcError>;
}

/// How often and how long [`confirm_transaction`] polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Poll until `signature` reaches `commitment`, the transaction fails on
/// chain, or `options.timeout` elapses.
pub async fn confirm_transaction<C: Connection + ?Sized>(
    connection: &C,
    signature: &Signature,
    commitment: CommitmentLevel,
    options: ConfirmOptions,
) -> Result<SignatureStatus, RpcError> {
    let deadline = Instant::now() + options.timeout;

    loop {
        if let Some(status) = connection.get_signature_status(signature).await? {
            if let Some(err) = &status.err {
                return Err(RpcError::TransactionFailed(err.to_string()));
            }
            if status.satisfies(commitment) {
                log::debug!("{} reached {} at slot {}", signature, commitment, status.slot);
                return Ok(status);
            }
        }

        if Instant::now() >= deadline {
            return Err(RpcError::ConfirmationTimeout {
                signature: signature.to_string(),
                secs: options.timeout.as_secs(),
            });
        }

        sleep(options.poll_interval).await;
    }
}
