//! Balance-gated simulate-then-send submission pipeline.

use std::sync::Arc;

use solana_signer::signers::Signers;
use solana_transaction::versioned::VersionedTransaction;

use super::{PreparationStage, StageEvent, StageLog, SubmitOutcome, TracingStageLog};
use crate::{
    builder::TxSkeleton,
    config::PipelineConfig,
    network::{ConfirmationReport, NetworkClient},
};

/// Runs one transaction through precheck, refresh, signing, simulation, broadcast, and
/// confirmation.
///
/// Every step may end the call early. Nothing is retried; the caller decides what to do
/// with a skipped outcome.
pub struct Submitter {
    /// Remote cluster access.
    network: Arc<dyn NetworkClient>,
    /// Stage transition sink.
    log: Arc<dyn StageLog>,
    /// Pipeline tuning.
    config: PipelineConfig,
}

impl Submitter {
    /// Creates a submitter that logs through `tracing`.
    #[must_use]
    pub fn new(network: Arc<dyn NetworkClient>, config: PipelineConfig) -> Self {
        Self {
            network,
            log: Arc::new(TracingStageLog),
            config,
        }
    }

    /// Replaces the stage log.
    #[must_use]
    pub fn with_stage_log(mut self, log: Arc<dyn StageLog>) -> Self {
        self.log = log;
        self
    }

    /// Submits `skeleton` signed by `signers`; the first signer pays fees.
    ///
    /// `required_balance` overrides [`PipelineConfig::default_required_balance`] when given.
    /// Any blockhash or fee payer already on the skeleton is replaced.
    pub async fn submit<T>(
        &self,
        skeleton: TxSkeleton,
        signers: &T,
        required_balance: Option<u64>,
    ) -> SubmitOutcome
    where
        T: Signers + ?Sized,
    {
        match self.run(skeleton, signers, required_balance).await {
            Ok(signature) => SubmitOutcome::Sent(signature),
            Err(outcome) => outcome,
        }
    }

    /// Pipeline body; `Err` carries the early-exit outcome.
    async fn run<T>(
        &self,
        mut skeleton: TxSkeleton,
        signers: &T,
        required_balance: Option<u64>,
    ) -> Result<String, SubmitOutcome>
    where
        T: Signers + ?Sized,
    {
        let Some(payer) = signers.pubkeys().first().copied() else {
            return Err(self.preparation_failed(
                PreparationStage::NoSigners,
                "no signing identities supplied",
            ));
        };

        if let Some(required) = required_balance.or(self.config.default_required_balance) {
            let balance = self
                .network
                .get_balance(&payer)
                .await
                .map_err(|error| self.preparation_failed(PreparationStage::Balance, error))?;
            if balance < required {
                self.log.record(&StageEvent::BalanceInsufficient {
                    payer,
                    balance,
                    required,
                });
                return Err(SubmitOutcome::SkippedInsufficientBalance { balance, required });
            }
            self.log.record(&StageEvent::BalanceSufficient {
                payer,
                balance,
                required,
            });
        }

        let blockhash = self
            .network
            .latest_blockhash()
            .await
            .map_err(|error| self.preparation_failed(PreparationStage::Blockhash, error))?;
        skeleton.stamp(blockhash, payer);

        let tx = skeleton
            .sign(signers)
            .map_err(|error| self.preparation_failed(PreparationStage::Signing, error))?;

        self.simulate(&tx).await?;

        let tx_bytes = bincode::serialize(&tx)
            .map_err(|error| self.preparation_failed(PreparationStage::Encoding, error))?;
        let signature = match self.network.send_raw(&tx_bytes).await {
            Ok(signature) => signature,
            Err(error) => {
                self.log.record(&StageEvent::SendFailed {
                    error: error.to_string(),
                });
                return Err(SubmitOutcome::SkippedSendError);
            }
        };
        self.log.record(&StageEvent::TxSent {
            signature: signature.clone(),
        });

        self.confirm(signature).await
    }

    /// Dry-runs the signed transaction.
    async fn simulate(&self, tx: &VersionedTransaction) -> Result<(), SubmitOutcome> {
        match self.network.simulate(tx).await {
            Ok(report) => match report.error {
                None => {
                    self.log.record(&StageEvent::SimulationSucceeded {
                        units_consumed: report.units_consumed,
                    });
                    Ok(())
                }
                Some(error) => {
                    self.log.record(&StageEvent::SimulationFailed {
                        error,
                        logs: report.logs,
                    });
                    Err(SubmitOutcome::SkippedSimulationFailed)
                }
            },
            Err(error) => {
                self.log.record(&StageEvent::SimulationError {
                    error: error.to_string(),
                });
                Err(SubmitOutcome::SkippedSimulationFailed)
            }
        }
    }

    /// Waits for the broadcast transaction to reach the configured commitment.
    async fn confirm(&self, signature: String) -> Result<String, SubmitOutcome> {
        let failure = match self
            .network
            .confirm(&signature, self.config.confirmation_level)
            .await
        {
            Ok(ConfirmationReport { error: None }) => {
                self.log.record(&StageEvent::Confirmed {
                    signature: signature.clone(),
                });
                return Ok(signature);
            }
            Ok(ConfirmationReport { error: Some(error) }) => StageEvent::ConfirmationFailed {
                signature: signature.clone(),
                error,
            },
            Err(error) => StageEvent::ConfirmationError {
                signature: signature.clone(),
                error: error.to_string(),
            },
        };
        self.log.record(&failure);
        self.log.record(&StageEvent::NotConfirmed { signature });
        Err(SubmitOutcome::SkippedNotConfirmed)
    }

    /// Logs a preparation failure and returns the matching outcome.
    fn preparation_failed(
        &self,
        stage: PreparationStage,
        error: impl ToString,
    ) -> SubmitOutcome {
        self.log.record(&StageEvent::PreparationFailed {
            stage,
            error: error.to_string(),
        });
        SubmitOutcome::SkippedPreparationFailed { stage }
    }
}
