//! Wallet context: which wallet, if any, is connected to the page.

use std::fmt;
use std::sync::Arc;

use chain_sol::{Pubkey, Signature, Signer, Transaction};
use sol_rpc::Connection;
use wallet_adapter::{WalletAdapter, WalletError};

use crate::error::SubmitError;

#[derive(Clone, Default)]
pub struct WalletContext {
    adapter: Option<Arc<dyn WalletAdapter>>,
}

impl WalletContext {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(adapter: Arc<dyn WalletAdapter>) -> Self {
        let mut context = Self::default();
        context.connect(adapter);
        context
    }

    pub fn connect(&mut self, adapter: Arc<dyn WalletAdapter>) {
        log::info!("Connected wallet {}", adapter.name());
        self.adapter = Some(adapter);
    }

    pub fn disconnect(&mut self) {
        if let Some(adapter) = self.adapter.take() {
            log::info!("Disconnected wallet {}", adapter.name());
        }
    }

    /// The connected account, read from the adapter.
    pub fn public_key(&self) -> Option<Pubkey> {
        self.adapter.as_ref().and_then(|a| a.public_key())
    }

    /// Fetch a blockhash, collect `signers`' signatures and the wallet's,
    /// then submit through `connection`.
    pub async fn send_transaction<C: Connection + ?Sized>(
        &self,
        mut tx: Transaction,
        connection: &C,
        signers: &[&dyn Signer],
    ) -> Result<Signature, SubmitError> {
        let adapter = self.adapter.as_ref().ok_or(WalletError::NotConnected)?;

        let latest = connection.get_latest_blockhash().await?;
        tx.set_recent_blockhash(latest.blockhash);
        tx.partial_sign(signers)?;
        adapter.sign_transaction(&mut tx)?;

        let wire = tx.serialize()?;
        Ok(connection.send_transaction(&wire).await?)
    }
}

impl fmt::Debug for WalletContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletContext")
            .field("wallet", &self.adapter.as_ref().map(|a| a.name().to_string()))
            .field("public_key", &self.public_key())
            .finish()
    }
}
