use std::path::Path;

use chain_sol::{Keypair, Pubkey, Signer, Transaction};
use secrecy::{ExposeSecret, SecretString};

use crate::error::WalletError;
use crate::{derivation, keypair_file};

/// The capability surface a connected wallet offers the page: who is
/// connected, and a way to sign transactions for that account.
pub trait WalletAdapter: Send + Sync {
    /// Human-readable wallet name for logs.
    fn name(&self) -> &str;

    /// The connected account, or `None` while disconnected.
    fn public_key(&self) -> Option<Pubkey>;

    /// Add this wallet's signature to `tx`. The blockhash must already be set.
    fn sign_transaction(&self, tx: &mut Transaction) -> Result<(), WalletError>;
}

/// A wallet backed by a keypair held in process memory.
#[derive(Debug)]
pub struct LocalWallet {
    name: String,
    keypair: Keypair,
}

impl LocalWallet {
    pub fn new(name: impl Into<String>, keypair: Keypair) -> Self {
        Self {
            name: name.into(),
            keypair,
        }
    }

    /// Load a `solana-keygen` JSON keypair file.
    pub fn from_keypair_file(path: &Path) -> Result<Self, WalletError> {
        let keypair = keypair_file::read_keypair_file(path)?;
        log::debug!("Loaded keypair {} from {}", keypair.pubkey(), path.display());
        Ok(Self::new(path.display().to_string(), keypair))
    }

    /// Derive the wallet at `m/44'/501'/{account}'/0'` from a BIP-39 phrase.
    pub fn from_mnemonic(
        phrase: &SecretString,
        passphrase: &SecretString,
        account: u32,
    ) -> Result<Self, WalletError> {
        let seed = derivation::seed_from_phrase(phrase.expose_secret(), passphrase.expose_secret())?;
        let keypair = derivation::derive_keypair(seed.as_slice(), account)?;
        Ok(Self::new(derivation::solana_derivation_path(account), keypair))
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

impl WalletAdapter for LocalWallet {
    fn name(&self) -> &str {
        &self.name
    }

    fn public_key(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    fn sign_transaction(&self, tx: &mut Transaction) -> Result<(), WalletError> {
        tx.partial_sign(&[&self.keypair])?;
        Ok(())
    }
}
