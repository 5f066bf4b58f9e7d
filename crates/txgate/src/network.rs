//! Network boundary used by the submission pipeline.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_transaction::versioned::VersionedTransaction;
use thiserror::Error;

/// Cluster commitment level, ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Block observed by the connected node, may still be skipped.
    Processed,
    /// Block voted on by a supermajority.
    Confirmed,
    /// Block rooted by a supermajority.
    #[default]
    Finalized,
}

impl Commitment {
    /// Returns the JSON-RPC name of this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }

    /// Returns true when `self` is at least as strong as `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown commitment level name.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("unknown commitment level `{0}` (expected processed, confirmed or finalized)")]
pub struct ParseCommitmentError(pub String);

impl FromStr for Commitment {
    type Err = ParseCommitmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            _ => Err(ParseCommitmentError(value.to_owned())),
        }
    }
}

/// Result of a dry-run execution.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SimulationReport {
    /// Structured execution error, `None` on predicted success.
    pub error: Option<serde_json::Value>,
    /// Program log lines emitted during simulation.
    pub logs: Vec<String>,
    /// Compute units consumed, when reported.
    pub units_consumed: Option<u64>,
}

/// Terminal status of a broadcast transaction.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ConfirmationReport {
    /// Structured execution error, `None` when the transaction landed cleanly.
    pub error: Option<serde_json::Value>,
}

/// Errors surfaced by network client implementations.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum NetworkError {
    /// Invalid client configuration.
    #[error("network client configuration invalid: {message}")]
    Config {
        /// Human-readable description.
        message: String,
    },
    /// Transaction could not be encoded for the wire.
    #[error("failed to encode transaction: {message}")]
    Encode {
        /// Human-readable description.
        message: String,
    },
    /// Request never produced a usable response.
    #[error("transport failure in `{method}`: {message}")]
    Transport {
        /// Remote method name.
        method: &'static str,
        /// Human-readable description.
        message: String,
    },
    /// Remote node returned a JSON-RPC error object.
    #[error("rpc method `{method}` error {code}: {message}")]
    Rpc {
        /// Remote method name.
        method: &'static str,
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the node.
        message: String,
    },
    /// Response could not be interpreted.
    #[error("invalid response from `{method}`: {message}")]
    InvalidResponse {
        /// Remote method name.
        method: &'static str,
        /// Human-readable description.
        message: String,
    },
    /// Waiting for a result exceeded the configured budget.
    #[error("timed out waiting for `{method}` after {waited_ms} ms")]
    Timeout {
        /// Remote method name.
        method: &'static str,
        /// Time spent waiting.
        waited_ms: u64,
    },
}

/// Remote cluster operations the submission pipeline depends on.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Returns the balance of `pubkey` in lamports.
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, NetworkError>;

    /// Returns the newest blockhash usable as a freshness token.
    async fn latest_blockhash(&self) -> Result<Hash, NetworkError>;

    /// Dry-runs a signed transaction against current state without committing.
    async fn simulate(&self, tx: &VersionedTransaction) -> Result<SimulationReport, NetworkError>;

    /// Broadcasts signed transaction bytes and returns the signature reported by the node.
    async fn send_raw(&self, tx_bytes: &[u8]) -> Result<String, NetworkError>;

    /// Waits until `signature` reaches `commitment` or fails on chain.
    async fn confirm(
        &self,
        signature: &str,
        commitment: Commitment,
    ) -> Result<ConfirmationReport, NetworkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_ordering_matches_strength() {
        assert!(Commitment::Finalized.satisfies(Commitment::Confirmed));
        assert!(Commitment::Confirmed.satisfies(Commitment::Confirmed));
        assert!(!Commitment::Processed.satisfies(Commitment::Confirmed));
        assert!(!Commitment::Confirmed.satisfies(Commitment::Finalized));
    }

    #[test]
    fn commitment_parses_case_insensitively() {
        assert_eq!("Finalized".parse::<Commitment>(), Ok(Commitment::Finalized));
        assert_eq!(" confirmed ".parse::<Commitment>(), Ok(Commitment::Confirmed));
        assert!("max".parse::<Commitment>().is_err());
    }

    #[test]
    fn commitment_serializes_lowercase() {
        let encoded = serde_json::to_string(&Commitment::Processed);
        assert_eq!(encoded.ok().as_deref(), Some("\"processed\""));
    }
}
