//! Explicit configuration passed to pipeline, client, and driver constructors.

use std::time::Duration;

use thiserror::Error;

use crate::network::Commitment;

/// Default JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
/// Default delay between consecutive driver jobs.
pub const DEFAULT_TX_DELAY: Duration = Duration::from_millis(500);

/// Configuration validation errors.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    /// RPC URL is not an http(s) URL.
    #[error("rpc url must start with http:// or https://, got `{url}`")]
    InvalidRpcUrl {
        /// Rejected value.
        url: String,
    },
    /// A duration that must be positive was zero.
    #[error("`{field}` must be greater than zero")]
    ZeroDuration {
        /// Offending field name.
        field: &'static str,
    },
}

/// Submission pipeline tuning.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PipelineConfig {
    /// Commitment the confirmation wait must reach.
    pub confirmation_level: Commitment,
    /// Balance requirement applied when a call does not pass its own.
    pub default_required_balance: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confirmation_level: Commitment::Finalized,
            default_required_balance: None,
        }
    }
}

/// JSON-RPC client tuning.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RpcClientConfig {
    /// Target JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Commitment used for reads, simulation, and preflight.
    pub commitment: Commitment,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Upper bound on one confirmation wait.
    pub confirm_timeout: Duration,
    /// Delay between signature status polls.
    pub poll_interval: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RPC_URL)
    }
}

impl RpcClientConfig {
    /// Creates a config for `rpc_url` with default timings.
    #[must_use]
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            commitment: Commitment::Confirmed,
            request_timeout: Duration::from_secs(10),
            confirm_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }

    /// Sets read/simulation commitment.
    #[must_use]
    pub const fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    /// Sets confirmation wait budget.
    #[must_use]
    pub const fn with_confirm_timeout(mut self, confirm_timeout: Duration) -> Self {
        self.confirm_timeout = confirm_timeout;
        self
    }

    /// Sets signature status poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Checks URL scheme and non-zero timings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.rpc_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidRpcUrl {
                url: self.rpc_url.clone(),
            });
        }
        for (field, value) in [
            ("request_timeout", self.request_timeout),
            ("confirm_timeout", self.confirm_timeout),
            ("poll_interval", self.poll_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration { field });
            }
        }
        Ok(())
    }
}

/// Sequential driver tuning.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DriverConfig {
    /// Fixed pause between consecutive jobs.
    pub tx_delay: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tx_delay: DEFAULT_TX_DELAY,
        }
    }
}

pub(crate) fn duration_to_ms_u64(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
