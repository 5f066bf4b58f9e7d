//! `txgate` command-line entrypoint.

#![cfg_attr(test, allow(clippy::missing_docs_in_private_items))]

use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use clap::{Args, Parser, Subcommand};
use solana_pubkey::Pubkey;
use solana_signer::Signer;
use solana_system_interface::instruction as system_instruction;
use thiserror::Error;
use txgate::{
    Commitment, DriverConfig, JsonRpcClient, KeyFileError, NetworkClient, NetworkError,
    PipelineConfig, RpcClientConfig, SequentialDriver, SubmitJob, Submitter, TxBuilder,
    config::DEFAULT_RPC_URL, logging::init_tracing, read_keypair_file,
};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "txgate",
    version,
    about = "Balance-gated, simulate-then-send Solana transaction submission"
)]
struct Cli {
    /// Connection options.
    #[command(flatten)]
    rpc: RpcArgs,
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Connection options shared by every subcommand.
#[derive(Debug, Args)]
struct RpcArgs {
    /// JSON-RPC endpoint.
    #[arg(long, env = "TXGATE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
    /// Commitment the confirmation wait must reach.
    #[arg(long, env = "TXGATE_COMMITMENT", default_value = "finalized")]
    commitment: Commitment,
    /// Commitment used for balance reads, blockhash fetches, and simulation.
    #[arg(long, env = "TXGATE_READ_COMMITMENT", default_value = "confirmed")]
    read_commitment: Commitment,
    /// Upper bound on one confirmation wait, in seconds.
    #[arg(long, env = "TXGATE_CONFIRM_TIMEOUT_SECS", default_value_t = 60)]
    confirm_timeout_secs: u64,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Send SOL from each keypair to one recipient, one wallet at a time.
    Transfer(TransferArgs),
    /// Print the balance of each keypair.
    Balance {
        /// Keypair files (Solana CLI JSON format).
        #[arg(long = "keypair", required = true)]
        keypairs: Vec<PathBuf>,
    },
}

/// `transfer` arguments.
#[derive(Debug, Args)]
struct TransferArgs {
    /// Keypair files (Solana CLI JSON format); each one pays for its own transfer.
    #[arg(long = "keypair", required = true)]
    keypairs: Vec<PathBuf>,
    /// Recipient address.
    #[arg(long)]
    to: Pubkey,
    /// Lamports to send from each wallet.
    #[arg(long)]
    lamports: u64,
    /// Skip wallets holding fewer lamports than this.
    #[arg(long, env = "TXGATE_REQUIRED_BALANCE")]
    required_balance: Option<u64>,
    /// Pause between wallets, in milliseconds.
    #[arg(long, env = "TXGATE_TX_DELAY_MS", default_value_t = 500)]
    tx_delay_ms: u64,
    /// Optional compute unit limit.
    #[arg(long)]
    compute_unit_limit: Option<u32>,
    /// Optional priority fee in micro-lamports per compute unit.
    #[arg(long)]
    priority_fee: Option<u64>,
}

/// Errors that abort the binary.
#[derive(Debug, Error)]
enum CliError {
    /// Keypair file could not be loaded.
    #[error(transparent)]
    KeyFile(#[from] KeyFileError),
    /// Network client failed outside the pipeline.
    #[error(transparent)]
    Network(#[from] NetworkError),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            tracing::error!(error = %error, "txgate failed");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected subcommand; `Ok(false)` means some work was skipped.
async fn run(cli: Cli) -> Result<bool, CliError> {
    let rpc_config = RpcClientConfig::new(cli.rpc.rpc_url)
        .with_commitment(cli.rpc.read_commitment)
        .with_confirm_timeout(Duration::from_secs(cli.rpc.confirm_timeout_secs));
    let client = Arc::new(JsonRpcClient::new(rpc_config)?);
    match cli.command {
        Command::Transfer(args) => transfer(client, cli.rpc.commitment, args).await,
        Command::Balance { keypairs } => balance(client.as_ref(), &keypairs).await,
    }
}

/// Drives one transfer job per keypair.
async fn transfer(
    client: Arc<JsonRpcClient>,
    commitment: Commitment,
    args: TransferArgs,
) -> Result<bool, CliError> {
    let wallets = args
        .keypairs
        .iter()
        .map(read_keypair_file)
        .collect::<Result<Vec<_>, _>>()?;
    let submitter = Submitter::new(
        client,
        PipelineConfig {
            confirmation_level: commitment,
            default_required_balance: args.required_balance,
        },
    );

    let jobs = args.keypairs.iter().zip(&wallets).map(|(path, wallet)| {
        let mut builder = TxBuilder::new();
        if let Some(units) = args.compute_unit_limit {
            builder = builder.with_compute_unit_limit(units);
        }
        if let Some(micro_lamports) = args.priority_fee {
            builder = builder.with_priority_fee_micro_lamports(micro_lamports);
        }
        SubmitJob {
            label: path.display().to_string(),
            skeleton: builder
                .add_instruction(system_instruction::transfer(
                    &wallet.pubkey(),
                    &args.to,
                    args.lamports,
                ))
                .build(),
            signers: vec![wallet as &dyn Signer],
            required_balance: None,
        }
    });

    let driver = SequentialDriver::new(
        &submitter,
        DriverConfig {
            tx_delay: Duration::from_millis(args.tx_delay_ms),
        },
    );
    let report = driver.run(jobs).await;
    for job in &report.jobs {
        println!("{}\t{}", job.label, job.outcome);
    }
    Ok(report.all_sent())
}

/// Prints the balance of each keypair.
async fn balance(client: &JsonRpcClient, keypairs: &[PathBuf]) -> Result<bool, CliError> {
    for path in keypairs {
        let wallet = read_keypair_file(path)?;
        let lamports = client.get_balance(&wallet.pubkey()).await?;
        println!("{}\t{}\t{lamports}", path.display(), wallet.pubkey());
    }
    Ok(true)
}
