//! Solana CLI keypair files: a JSON array of the 64 keypair bytes.

use std::fs;
use std::path::Path;

use chain_sol::Keypair;
use zeroize::Zeroize;

use crate::error::WalletError;

/// Read a keypair written by `solana-keygen` (e.g. `~/.config/solana/id.json`).
pub fn read_keypair_file(path: &Path) -> Result<Keypair, WalletError> {
    let invalid = |reason: String| WalletError::InvalidKeypairFile {
        path: path.display().to_string(),
        reason,
    };

    let mut contents = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let parsed: Result<Vec<u8>, _> = serde_json::from_str(&contents);
    contents.zeroize();

    let mut bytes = parsed.map_err(|e| invalid(e.to_string()))?;
    let keypair = Keypair::from_bytes(&bytes).map_err(|e| invalid(e.to_string()));
    bytes.zeroize();

    keypair
}
