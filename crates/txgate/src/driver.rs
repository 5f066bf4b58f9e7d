//! Sequential orchestration over a list of submission jobs.

use solana_signer::Signer;
use tokio::time::sleep;

use crate::{
    builder::TxSkeleton,
    config::DriverConfig,
    submit::{SubmitOutcome, Submitter},
};

/// One transaction to push through the pipeline.
pub struct SubmitJob<'signer> {
    /// Caller-chosen name used in logs and the report.
    pub label: String,
    /// Unsigned transaction.
    pub skeleton: TxSkeleton,
    /// Signers in order; the first pays fees.
    pub signers: Vec<&'signer dyn Signer>,
    /// Per-job balance requirement.
    pub required_balance: Option<u64>,
}

/// Outcome of one job.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JobReport {
    /// Job label.
    pub label: String,
    /// Pipeline outcome.
    pub outcome: SubmitOutcome,
}

/// Outcomes of a full driver run, in job order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DriverReport {
    /// Per-job outcomes.
    pub jobs: Vec<JobReport>,
}

impl DriverReport {
    /// Number of jobs that ended in [`SubmitOutcome::Sent`].
    #[must_use]
    pub fn sent(&self) -> usize {
        self.jobs.iter().filter(|job| job.outcome.is_sent()).count()
    }

    /// Number of jobs that were skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.jobs.len().saturating_sub(self.sent())
    }

    /// True when every job was sent.
    #[must_use]
    pub fn all_sent(&self) -> bool {
        self.skipped() == 0
    }
}

/// Drives jobs one at a time with a fixed pause between them.
///
/// Job `i` finishes (sent or skipped) before job `i + 1` starts. A skipped job never stops
/// the run.
pub struct SequentialDriver<'submitter> {
    /// Pipeline used for every job.
    submitter: &'submitter Submitter,
    /// Pause configuration.
    config: DriverConfig,
}

impl<'submitter> SequentialDriver<'submitter> {
    /// Creates a driver over `submitter`.
    #[must_use]
    pub const fn new(submitter: &'submitter Submitter, config: DriverConfig) -> Self {
        Self { submitter, config }
    }

    /// Runs every job in order and collects their outcomes.
    pub async fn run<'signer, I>(&self, jobs: I) -> DriverReport
    where
        I: IntoIterator<Item = SubmitJob<'signer>>,
    {
        let mut report = DriverReport::default();
        let mut jobs = jobs.into_iter().peekable();
        while let Some(job) = jobs.next() {
            tracing::info!(job = %job.label, "submitting job");
            let outcome = self
                .submitter
                .submit(job.skeleton, job.signers.as_slice(), job.required_balance)
                .await;
            tracing::info!(
                job = %job.label,
                outcome = outcome.label(),
                detail = %outcome,
                "job finished"
            );
            report.jobs.push(JobReport {
                label: job.label,
                outcome,
            });
            if jobs.peek().is_some() && !self.config.tx_delay.is_zero() {
                sleep(self.config.tx_delay).await;
            }
        }
        tracing::info!(
            sent = report.sent(),
            skipped = report.skipped(),
            "driver run complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use async_trait::async_trait;
    use solana_hash::Hash;
    use solana_keypair::Keypair;
    use solana_pubkey::Pubkey;
    use solana_system_interface::instruction as system_instruction;
    use solana_transaction::versioned::VersionedTransaction;
    use tokio::time::Instant;

    use super::*;
    use crate::{
        builder::TxBuilder,
        config::PipelineConfig,
        network::{
            Commitment, ConfirmationReport, NetworkClient, NetworkError, SimulationReport,
        },
    };

    /// Network whose balances are looked up per payer; every other call succeeds.
    #[derive(Debug, Default)]
    struct WalletNetwork {
        /// Funded payers and their balances.
        balances: Vec<(Pubkey, u64)>,
        /// Virtual instants at which each send happened.
        send_times: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl NetworkClient for WalletNetwork {
        async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, NetworkError> {
            Ok(self
                .balances
                .iter()
                .find(|(candidate, _)| candidate == pubkey)
                .map_or(0, |(_, balance)| *balance))
        }

        async fn latest_blockhash(&self) -> Result<Hash, NetworkError> {
            Ok(Hash::new_from_array([6_u8; 32]))
        }

        async fn simulate(
            &self,
            _tx: &VersionedTransaction,
        ) -> Result<SimulationReport, NetworkError> {
            Ok(SimulationReport::default())
        }

        async fn send_raw(&self, _tx_bytes: &[u8]) -> Result<String, NetworkError> {
            let mut times = self
                .send_times
                .lock()
                .map_err(|error| NetworkError::Transport {
                    method: "sendTransaction",
                    message: error.to_string(),
                })?;
            times.push(Instant::now());
            Ok(format!("sig-{}", times.len()))
        }

        async fn confirm(
            &self,
            _signature: &str,
            _commitment: Commitment,
        ) -> Result<ConfirmationReport, NetworkError> {
            Ok(ConfirmationReport::default())
        }
    }

    fn job<'signer>(label: &str, wallet: &'signer Keypair) -> SubmitJob<'signer> {
        SubmitJob {
            label: label.to_owned(),
            skeleton: TxBuilder::new()
                .add_instruction(system_instruction::transfer(
                    &wallet.pubkey(),
                    &Pubkey::new_unique(),
                    5_000,
                ))
                .build(),
            signers: vec![wallet as &dyn Signer],
            required_balance: Some(1_000_000),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn skipped_job_does_not_stop_the_run() {
        let funded_a = Keypair::new();
        let empty = Keypair::new();
        let funded_b = Keypair::new();
        let network = Arc::new(WalletNetwork {
            balances: vec![(funded_a.pubkey(), 2_000_000), (funded_b.pubkey(), 3_000_000)],
            send_times: Mutex::new(Vec::new()),
        });
        let submitter = Submitter::new(network.clone(), PipelineConfig::default());
        let driver = SequentialDriver::new(
            &submitter,
            DriverConfig {
                tx_delay: Duration::from_millis(500),
            },
        );

        let report = driver
            .run(vec![
                job("wallet-0", &funded_a),
                job("wallet-1", &empty),
                job("wallet-2", &funded_b),
            ])
            .await;

        assert_eq!(report.jobs.len(), 3);
        assert_eq!(report.sent(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(!report.all_sent());
        let labels: Vec<&str> = report.jobs.iter().map(|job| job.label.as_str()).collect();
        assert_eq!(labels, vec!["wallet-0", "wallet-1", "wallet-2"]);
        let outcomes: Vec<&str> = report.jobs.iter().map(|job| job.outcome.label()).collect();
        assert_eq!(
            outcomes,
            vec!["sent", "skipped_insufficient_balance", "sent"]
        );
        assert_eq!(
            report.jobs.get(1).map(|job| job.outcome.clone()),
            Some(SubmitOutcome::SkippedInsufficientBalance {
                balance: 0,
                required: 1_000_000,
            })
        );
        assert_eq!(
            report.jobs.get(2).map(|job| job.outcome.clone()),
            Some(SubmitOutcome::Sent("sig-2".to_owned()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn delay_separates_consecutive_jobs() {
        let first = Keypair::new();
        let second = Keypair::new();
        let network = Arc::new(WalletNetwork {
            balances: vec![(first.pubkey(), 2_000_000), (second.pubkey(), 2_000_000)],
            send_times: Mutex::new(Vec::new()),
        });
        let submitter = Submitter::new(network.clone(), PipelineConfig::default());
        let driver = SequentialDriver::new(
            &submitter,
            DriverConfig {
                tx_delay: Duration::from_millis(750),
            },
        );

        let started = Instant::now();
        let report = driver
            .run(vec![job("first", &first), job("second", &second)])
            .await;
        assert!(report.all_sent());

        let times = network
            .send_times
            .lock()
            .map(|times| times.clone())
            .unwrap_or_default();
        assert_eq!(times.len(), 2);
        if let (Some(first_sent), Some(second_sent)) = (times.first(), times.get(1)) {
            assert!(second_sent.duration_since(*first_sent) >= Duration::from_millis(750));
        }
        // No trailing pause after the last job.
        assert!(started.elapsed() < Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn empty_job_list_yields_empty_report() {
        let network = Arc::new(WalletNetwork::default());
        let submitter = Submitter::new(network, PipelineConfig::default());
        let driver = SequentialDriver::new(&submitter, DriverConfig::default());

        let report = driver.run(Vec::new()).await;
        assert_eq!(report, DriverReport::default());
        assert!(report.all_sent());
    }
}
