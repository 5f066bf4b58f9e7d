//! Stage transition events and the logging collaborator that receives them.

use solana_pubkey::Pubkey;

use super::PreparationStage;

/// Severity of a stage event.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StageLevel {
    /// Normal progress.
    Info,
    /// Skipped without touching the network state.
    Warn,
    /// Failure after work was attempted.
    Error,
}

/// One pipeline stage transition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StageEvent {
    /// Fee payer balance is below the requirement.
    BalanceInsufficient {
        /// Fee payer.
        payer: Pubkey,
        /// Observed lamports.
        balance: u64,
        /// Required lamports.
        required: u64,
    },
    /// Fee payer balance meets the requirement.
    BalanceSufficient {
        /// Fee payer.
        payer: Pubkey,
        /// Observed lamports.
        balance: u64,
        /// Required lamports.
        required: u64,
    },
    /// A step before simulation failed.
    PreparationFailed {
        /// Step that failed.
        stage: PreparationStage,
        /// Error description.
        error: String,
    },
    /// Dry run predicted success.
    SimulationSucceeded {
        /// Compute units consumed, when reported.
        units_consumed: Option<u64>,
    },
    /// Dry run predicted failure.
    SimulationFailed {
        /// Structured execution error.
        error: serde_json::Value,
        /// Program logs from the dry run.
        logs: Vec<String>,
    },
    /// Simulate call itself failed.
    SimulationError {
        /// Error description.
        error: String,
    },
    /// Broadcast accepted.
    TxSent {
        /// Signature returned by the node.
        signature: String,
    },
    /// Broadcast call failed.
    SendFailed {
        /// Error description.
        error: String,
    },
    /// Transaction reached the required commitment.
    Confirmed {
        /// Transaction signature.
        signature: String,
    },
    /// Network reported an execution error for the transaction.
    ConfirmationFailed {
        /// Transaction signature.
        signature: String,
        /// Structured execution error.
        error: serde_json::Value,
    },
    /// Confirmation wait itself failed.
    ConfirmationError {
        /// Transaction signature.
        signature: String,
        /// Error description.
        error: String,
    },
    /// Final marker for any confirmation failure.
    NotConfirmed {
        /// Transaction signature.
        signature: String,
    },
}

impl StageEvent {
    /// Returns the stage tag attached to the log line.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::BalanceInsufficient { .. } | Self::BalanceSufficient { .. } => "BALANCE",
            Self::PreparationFailed { .. } => "PREPARATION",
            Self::SimulationSucceeded { .. } => "SIMULATION SUCCESS",
            Self::SimulationFailed { .. } => "SIMULATION FAILED",
            Self::SimulationError { .. } => "SIMULATION ERROR",
            Self::TxSent { .. } => "TX SENT",
            Self::SendFailed { .. } => "SEND ERROR",
            Self::Confirmed { .. } => "CONFIRMED",
            Self::ConfirmationFailed { .. } => "CONFIRMATION FAILED",
            Self::ConfirmationError { .. } => "CONFIRMATION ERROR",
            Self::NotConfirmed { .. } => "TX NOT CONFIRMED",
        }
    }

    /// Returns the severity.
    #[must_use]
    pub const fn level(&self) -> StageLevel {
        match self {
            Self::BalanceSufficient { .. }
            | Self::SimulationSucceeded { .. }
            | Self::TxSent { .. }
            | Self::Confirmed { .. } => StageLevel::Info,
            Self::BalanceInsufficient { .. } => StageLevel::Warn,
            Self::PreparationFailed { .. }
            | Self::SimulationFailed { .. }
            | Self::SimulationError { .. }
            | Self::SendFailed { .. }
            | Self::ConfirmationFailed { .. }
            | Self::ConfirmationError { .. }
            | Self::NotConfirmed { .. } => StageLevel::Error,
        }
    }
}

/// Receiver for pipeline stage transitions.
pub trait StageLog: Send + Sync {
    /// Records one transition.
    fn record(&self, event: &StageEvent);
}

/// [`StageLog`] that emits `tracing` events tagged with a `stage` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStageLog;

impl StageLog for TracingStageLog {
    fn record(&self, event: &StageEvent) {
        let stage = event.stage();
        match event {
            StageEvent::BalanceInsufficient {
                payer,
                balance,
                required,
            } => {
                tracing::warn!(
                    stage,
                    payer = %payer,
                    balance,
                    required,
                    "wallet has insufficient balance"
                );
            }
            StageEvent::BalanceSufficient {
                payer,
                balance,
                required,
            } => {
                tracing::info!(stage, payer = %payer, balance, required, "balance precheck passed");
            }
            StageEvent::PreparationFailed { stage: step, error } => {
                tracing::error!(
                    stage,
                    step = %step,
                    error = %error,
                    "transaction preparation failed"
                );
            }
            StageEvent::SimulationSucceeded { units_consumed } => {
                tracing::info!(stage, units_consumed = ?units_consumed, "simulation succeeded");
            }
            StageEvent::SimulationFailed { error, logs } => {
                tracing::error!(
                    stage,
                    error = %error,
                    logs = ?logs,
                    "simulation reported an error"
                );
            }
            StageEvent::SimulationError { error } => {
                tracing::error!(stage, error = %error, "simulation request failed");
            }
            StageEvent::TxSent { signature } => {
                tracing::info!(stage, signature = %signature, "transaction broadcast");
            }
            StageEvent::SendFailed { error } => {
                tracing::error!(stage, error = %error, "transaction broadcast failed");
            }
            StageEvent::Confirmed { signature } => {
                tracing::info!(stage, signature = %signature, "transaction confirmed");
            }
            StageEvent::ConfirmationFailed { signature, error } => {
                tracing::error!(
                    stage,
                    signature = %signature,
                    error = %error,
                    "transaction failed on chain"
                );
            }
            StageEvent::ConfirmationError { signature, error } => {
                tracing::error!(
                    stage,
                    signature = %signature,
                    error = %error,
                    "confirmation wait failed"
                );
            }
            StageEvent::NotConfirmed { signature } => {
                tracing::error!(stage, signature = %signature, "transaction not confirmed");
            }
        }
    }
}
