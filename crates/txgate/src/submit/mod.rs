//! Submission pipeline, outcomes, and stage logging.

mod log;
mod pipeline;
mod types;

pub use log::{StageEvent, StageLevel, StageLog, TracingStageLog};
pub use pipeline::Submitter;
pub use types::{PreparationStage, SubmitOutcome};
