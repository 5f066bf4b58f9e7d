//! Submission outcomes and preparation stages.

use std::fmt;

/// Step that failed before the transaction reached simulation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PreparationStage {
    /// Signer list was empty.
    NoSigners,
    /// Balance query failed.
    Balance,
    /// Blockhash fetch failed.
    Blockhash,
    /// Skeleton could not be signed.
    Signing,
    /// Signed transaction could not be serialized.
    Encoding,
}

impl PreparationStage {
    /// Returns a short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoSigners => "no_signers",
            Self::Balance => "balance",
            Self::Blockhash => "blockhash",
            Self::Signing => "signing",
            Self::Encoding => "encoding",
        }
    }
}

impl fmt::Display for PreparationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one pipeline invocation.
///
/// Only [`SubmitOutcome::Sent`] means the transaction landed; every other variant means the
/// call gave up at the named step and nothing further was attempted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// Transaction confirmed; carries the signature reported at broadcast.
    Sent(String),
    /// Fee payer balance was below the requirement; nothing was signed or sent.
    SkippedInsufficientBalance {
        /// Observed balance in lamports.
        balance: u64,
        /// Required balance in lamports.
        required: u64,
    },
    /// A step before simulation failed.
    SkippedPreparationFailed {
        /// Step that failed.
        stage: PreparationStage,
    },
    /// Simulation predicted failure, or the simulate call itself failed.
    SkippedSimulationFailed,
    /// Broadcast call failed.
    SkippedSendError,
    /// Transaction was broadcast but did not reach the required commitment cleanly.
    SkippedNotConfirmed,
}

impl SubmitOutcome {
    /// Returns true for [`SubmitOutcome::Sent`].
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    /// Returns the confirmed signature, if any.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        match self {
            Self::Sent(signature) => Some(signature),
            _ => None,
        }
    }

    /// Returns a stable snake_case label for logs and reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Sent(_) => "sent",
            Self::SkippedInsufficientBalance { .. } => "skipped_insufficient_balance",
            Self::SkippedPreparationFailed { .. } => "skipped_preparation_failed",
            Self::SkippedSimulationFailed => "skipped_simulation_failed",
            Self::SkippedSendError => "skipped_send_error",
            Self::SkippedNotConfirmed => "skipped_not_confirmed",
        }
    }
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent(signature) => write!(f, "sent {signature}"),
            Self::SkippedInsufficientBalance { balance, required } => {
                write!(f, "skipped: balance {balance} below required {required}")
            }
            Self::SkippedPreparationFailed { stage } => {
                write!(f, "skipped: preparation failed at {stage}")
            }
            Self::SkippedSimulationFailed => f.write_str("skipped: simulation failed"),
            Self::SkippedSendError => f.write_str("skipped: send error"),
            Self::SkippedNotConfirmed => f.write_str("skipped: not confirmed"),
        }
    }
}
