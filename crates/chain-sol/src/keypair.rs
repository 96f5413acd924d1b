//! Ed25519 keypairs, signatures and the `Signer` seam.
//!
//! Keypairs serialize in the 64-byte layout used by the Solana CLI
//! (`secret || public`), so `id.json` files round-trip through
//! [`Keypair::from_bytes`] / [`Keypair::to_bytes`].

use std::fmt;

use ed25519_dalek::Signer as _;
use rand::rngs::OsRng;

use crate::address::Pubkey;
use crate::error::SolError;

/// A 64-byte Ed25519 signature as carried in a transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// An all-zero placeholder for a signer that has not signed yet.
    pub const fn unsigned() -> Self {
        Self([0u8; 64])
    }

    pub fn is_unsigned(&self) -> bool {
        self.0 == [0u8; 64]
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::unsigned()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// Anything that can produce a signature for a transaction message.
pub trait Signer {
    fn pubkey(&self) -> Pubkey;

    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SolError>;
}

/// An Ed25519 keypair. The secret half is zeroized on drop by `ed25519-dalek`.
pub struct Keypair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS random source.
    pub fn generate() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Parse the 64-byte `secret || public` layout, checking that the public
    /// half matches the secret half.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: &[u8; 64] = bytes.try_into().map_err(|_| {
            SolError::InvalidKeypair(format!("expected 64 bytes, got {}", bytes.len()))
        })?;

        let signing_key = ed25519_dalek::SigningKey::from_keypair_bytes(arr)
            .map_err(|e| SolError::InvalidKeypair(e.to_string()))?;

        Ok(Self { signing_key })
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }
}

impl Signer for Keypair {
    fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.signing_key.verifying_key().to_bytes())
    }

    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SolError> {
        let signature = self.signing_key.sign(message);
        Ok(Signature(signature.to_bytes()))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}
