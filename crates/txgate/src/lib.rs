#![forbid(unsafe_code)]
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::indexing_slicing,
        clippy::missing_docs_in_private_items,
        clippy::panic,
        missing_docs
    )
)]

//! Balance-gated, simulate-then-send Solana transaction submission.
//!
//! Start from [`Submitter`] for one transaction, or [`SequentialDriver`] to push a list of
//! jobs through it one at a time. [`JsonRpcClient`] is the stock [`NetworkClient`].

/// Transaction skeleton and builder helpers.
pub mod builder;
/// Explicit configuration structs.
pub mod config;
/// Sequential job driver.
pub mod driver;
/// Keypair file loading.
pub mod keys;
/// Tracing subscriber setup.
pub mod logging;
/// Network boundary trait and report types.
pub mod network;
/// JSON-RPC network client.
pub mod rpc;
/// Submission pipeline.
pub mod submit;

pub use builder::{BuilderError, TxBuilder, TxSkeleton};
pub use config::{ConfigError, DriverConfig, PipelineConfig, RpcClientConfig};
pub use driver::{DriverReport, JobReport, SequentialDriver, SubmitJob};
pub use keys::{KeyFileError, read_keypair_file};
pub use network::{
    Commitment, ConfirmationReport, NetworkClient, NetworkError, SimulationReport,
};
pub use rpc::JsonRpcClient;
pub use submit::{
    PreparationStage, StageEvent, StageLevel, StageLog, SubmitOutcome, Submitter,
    TracingStageLog,
};
