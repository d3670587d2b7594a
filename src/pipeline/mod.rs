//! Simulated staged processing around each evaluation.
//!
//! - `state`: the `Idle → Staging → Processing → Finalizing → Idle` machine
//! - `schedule`: the fixed sequence of timed progress ticks
//! - `driver`: runs the machine on the tokio clock and emits UI events

mod driver;
mod schedule;
mod state;

pub use driver::run_evaluation;
pub use schedule::{ProgressSchedule, TickStep};
pub use state::{
    EvaluationPipeline, Outcome, PipelineEvent, PipelineState, STATUS_CAPACITY, STATUS_COMPLETE,
    STATUS_ERROR, STATUS_PROCESSING, STATUS_STAGING,
};
