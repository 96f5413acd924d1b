//! Commitment levels and signature status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How far a transaction must progress before it counts as final.
///
/// Ordered: `Processed < Confirmed < Finalized`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentLevel {
    #[default]
    Processed,
    Confirmed,
    Finalized,
}

impl CommitmentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentLevel::Processed => "processed",
            CommitmentLevel::Confirmed => "confirmed",
            CommitmentLevel::Finalized => "finalized",
        }
    }
}

impl fmt::Display for CommitmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitmentLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "processed" => Ok(CommitmentLevel::Processed),
            "confirmed" => Ok(CommitmentLevel::Confirmed),
            "finalized" => Ok(CommitmentLevel::Finalized),
            other => Err(format!("unknown commitment level: {other}")),
        }
    }
}

/// One entry of a `getSignatureStatuses` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    /// `None` once the block is rooted.
    pub confirmations: Option<u64>,
    /// The on-chain error, if the transaction failed.
    pub err: Option<serde_json::Value>,
    pub confirmation_status: Option<CommitmentLevel>,
}

impl SignatureStatus {
    /// Whether the transaction has reached `commitment`.
    ///
    /// Older nodes omit `confirmationStatus`; a rooted block (no
    /// confirmation count) is treated as finalized, anything else as
    /// processed.
    pub fn satisfies(&self, commitment: CommitmentLevel) -> bool {
        let reached = self.confirmation_status.unwrap_or(match self.confirmations {
            None => CommitmentLevel::Finalized,
            Some(_) => CommitmentLevel::Processed,
        });
        reached >= commitment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(json: serde_json::Value) -> SignatureStatus {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn ordering() {
        assert!(CommitmentLevel::Processed < CommitmentLevel::Confirmed);
        assert!(CommitmentLevel::Confirmed < CommitmentLevel::Finalized);
        assert_eq!(CommitmentLevel::default(), CommitmentLevel::Processed);
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("Confirmed".parse::<CommitmentLevel>().unwrap(), CommitmentLevel::Confirmed);
        assert_eq!(CommitmentLevel::Finalized.to_string(), "finalized");
        assert!("recent".parse::<CommitmentLevel>().is_err());
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&CommitmentLevel::Processed).unwrap();
        assert_eq!(json, "\"processed\"");
    }

    #[test]
    fn confirmed_status_satisfies_processed_and_confirmed() {
        let s = status(serde_json::json!({
            "slot": 10, "confirmations": 3, "err": null, "confirmationStatus": "confirmed"
        }));
        assert!(s.satisfies(CommitmentLevel::Processed));
        assert!(s.satisfies(CommitmentLevel::Confirmed));
        assert!(!s.satisfies(CommitmentLevel::Finalized));
    }

    #[test]
    fn legacy_status_without_confirmation_status() {
        let rooted = status(serde_json::json!({ "slot": 1, "confirmations": null, "err": null }));
        assert!(rooted.satisfies(CommitmentLevel::Finalized));

        let recent = status(serde_json::json!({ "slot": 1, "confirmations": 0, "err": null }));
        assert!(recent.satisfies(CommitmentLevel::Processed));
        assert!(!recent.satisfies(CommitmentLevel::Confirmed));
    }
}
