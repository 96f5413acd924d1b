//! The shared send-and-confirm path every handler goes through.

use chain_sol::{Signature, Signer, Transaction};
use sol_rpc::{confirm_transaction, CommitmentLevel, ConfirmOptions, Connection};

use crate::context::WalletContext;
use crate::error::SubmitError;

pub struct Submitter<C> {
    connection: C,
    commitment: CommitmentLevel,
    confirm: ConfirmOptions,
}

impl<C: Connection> Submitter<C> {
    pub fn new(connection: C, commitment: CommitmentLevel, confirm: ConfirmOptions) -> Self {
        Self {
            connection,
            commitment,
            confirm,
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Have the wallet sign and send `tx`, then wait for the configured
    /// commitment.
    ///
    /// Every failure is logged and collapses to `None`.
    pub async fn submit(
        &self,
        wallet: &WalletContext,
        tx: Transaction,
        signers: &[&dyn Signer],
    ) -> Option<Signature> {
        log::info!("Sending transaction...");

        match self.send_and_confirm(wallet, tx, signers).await {
            Ok(signature) => {
                log::info!("Transaction signature: {}", signature);
                Some(signature)
            }
            Err(e) => {
                log::error!("Error sending transaction: {}", e);
                None
            }
        }
    }

    async fn send_and_confirm(
        &self,
        wallet: &WalletContext,
        tx: Transaction,
        signers: &[&dyn Signer],
    ) -> Result<Signature, SubmitError> {
        let signature = wallet.send_transaction(tx, &self.connection, signers).await?;
        confirm_transaction(&self.connection, &signature, self.commitment, self.confirm).await?;
        Ok(signature)
    }
}
