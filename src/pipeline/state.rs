//! The staged evaluation state machine.
//!
//! Each transition returns the UI updates it implies as [`PipelineEvent`]s.
//! Timing lives in the driver; this type only enforces ordering, so the
//! evaluation step cannot run before every progress tick has been observed.

use crate::calculator::{
    EvaluationOutcome, ExpressionBuilder, Perturbation, evaluate, format_result,
};
use crate::config::Config;
use std::fmt;
use tracing::{debug, info, warn};

pub const STATUS_STAGING: &str = "importing";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_COMPLETE: &str = "computation complete";
pub const STATUS_CAPACITY: &str = "insufficient computational capacity";
pub const STATUS_ERROR: &str = "error";

/// Progress shown when the capacity check fails.
const CAPACITY_PROGRESS: u8 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Staging,
    Processing(u8),
    Finalizing,
    CapacityWarning,
    ErrorReported,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Staging => write!(f, "staging"),
            Self::Processing(p) => write!(f, "processing({})", p),
            Self::Finalizing => write!(f, "finalizing"),
            Self::CapacityWarning => write!(f, "capacity-warning"),
            Self::ErrorReported => write!(f, "error-reported"),
        }
    }
}

/// Terminal notification for one evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Completed(f64),
    CapacityExceeded,
    Error(String),
}

impl Outcome {
    /// Text for the warning dialog, if this outcome raises one.
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Completed(_) => None,
            Self::CapacityExceeded => Some(STATUS_CAPACITY.to_string()),
            Self::Error(message) => Some(message.clone()),
        }
    }
}

impl From<EvaluationOutcome> for Outcome {
    fn from(outcome: EvaluationOutcome) -> Self {
        match outcome {
            EvaluationOutcome::Success(value) => Self::Completed(value),
            EvaluationOutcome::CapacityExceeded(value) => {
                debug!(value, "capacity exceeded");
                Self::CapacityExceeded
            }
            EvaluationOutcome::SyntaxInvalid => Self::Error("invalid expression".to_string()),
            EvaluationOutcome::RuntimeError(message) => {
                Self::Error(format!("evaluation error: {}", message))
            }
        }
    }
}

/// A UI update for the collaborator.
#[derive(Clone, Debug, PartialEq)]
pub enum PipelineEvent {
    Status(String),
    Progress(u8),
    ProgressHidden,
    /// New text for the display field.
    Display(String),
    Finished(Outcome),
    /// The progress indicator should close.
    Closed,
}

#[derive(Debug)]
pub struct EvaluationPipeline {
    state: PipelineState,
    expression: String,
    step: u8,
    ceiling: f64,
}

impl EvaluationPipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            state: PipelineState::Idle,
            expression: String::new(),
            step: config.progress_step.max(1),
            ceiling: config.capacity_ceiling,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Start a run. Returns no events and stays idle for an empty
    /// expression or while another run is in flight.
    pub fn begin(&mut self, expression: &str) -> Vec<PipelineEvent> {
        if expression.is_empty() {
            return Vec::new();
        }
        if self.state != PipelineState::Idle {
            debug!(state = %self.state, "evaluation already in flight");
            return Vec::new();
        }

        self.expression = expression.to_string();
        self.state = PipelineState::Staging;
        let mut events = vec![PipelineEvent::Status(STATUS_STAGING.to_string())];

        self.state = PipelineState::Processing(0);
        events.push(PipelineEvent::Progress(0));
        events.push(PipelineEvent::Status(STATUS_PROCESSING.to_string()));
        debug!(expression, "evaluation started");
        events
    }

    /// Advance progress by one step. Reaching 100 moves to `Finalizing`.
    pub fn tick(&mut self) -> Vec<PipelineEvent> {
        let PipelineState::Processing(progress) = self.state else {
            return Vec::new();
        };

        let progress = progress.saturating_add(self.step).min(100);
        self.state = if progress >= 100 {
            PipelineState::Finalizing
        } else {
            PipelineState::Processing(progress)
        };
        vec![PipelineEvent::Progress(progress)]
    }

    pub fn is_finalizing(&self) -> bool {
        self.state == PipelineState::Finalizing
    }

    /// Run the actual evaluation. Only valid once every tick has fired.
    ///
    /// On success the builder shows the result and arms its fresh-result
    /// flag. On failure the builder is left untouched.
    pub fn finalize(
        &mut self,
        builder: &mut ExpressionBuilder,
        perturbation: &mut dyn Perturbation,
    ) -> Vec<PipelineEvent> {
        if self.state != PipelineState::Finalizing {
            warn!(state = %self.state, "finalize called before progress completed");
            return Vec::new();
        }

        let outcome = Outcome::from(evaluate(&self.expression, perturbation, self.ceiling));
        match &outcome {
            Outcome::Completed(value) => {
                let text = format_result(*value);
                info!(expression = %self.expression, result = %text, "evaluation complete");
                builder.commit_result(text.clone());
                vec![
                    PipelineEvent::Status(STATUS_COMPLETE.to_string()),
                    PipelineEvent::Progress(100),
                    PipelineEvent::Display(text),
                    PipelineEvent::Finished(outcome.clone()),
                ]
            }
            Outcome::CapacityExceeded => {
                warn!(expression = %self.expression, "result exceeds capacity");
                self.state = PipelineState::CapacityWarning;
                vec![
                    PipelineEvent::Status(STATUS_CAPACITY.to_string()),
                    PipelineEvent::Progress(CAPACITY_PROGRESS),
                    PipelineEvent::Finished(outcome.clone()),
                ]
            }
            Outcome::Error(message) => {
                warn!(expression = %self.expression, %message, "evaluation failed");
                self.state = PipelineState::ErrorReported;
                vec![
                    PipelineEvent::Status(STATUS_ERROR.to_string()),
                    PipelineEvent::ProgressHidden,
                    PipelineEvent::Finished(outcome.clone()),
                ]
            }
        }
    }

    /// Close the progress indication and return to `Idle`.
    pub fn close(&mut self) -> Vec<PipelineEvent> {
        if self.state == PipelineState::Idle {
            return Vec::new();
        }
        self.state = PipelineState::Idle;
        self.expression.clear();
        vec![PipelineEvent::Closed]
    }
}
