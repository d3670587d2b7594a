//! Runs the pipeline against the clock.

use super::schedule::ProgressSchedule;
use super::state::{EvaluationPipeline, Outcome, PipelineEvent};
use crate::calculator::{ExpressionBuilder, Perturbation};
use crate::config::Config;
use flume::Sender;
use tokio::time::{Instant, sleep, sleep_until};

fn emit(events: &Sender<PipelineEvent>, batch: Vec<PipelineEvent>) {
    for event in batch {
        // A closed receiver only means nobody is watching.
        let _ = events.send(event);
    }
}

/// Drive one evaluation from `begin` to `close`.
///
/// Progress ticks are scheduled from a fixed start instant so they fire in
/// order without drift. Returns `None` when the pipeline did not start.
pub async fn run_evaluation(
    pipeline: &mut EvaluationPipeline,
    builder: &mut ExpressionBuilder,
    expression: &str,
    config: &Config,
    perturbation: &mut dyn Perturbation,
    events: &Sender<PipelineEvent>,
) -> Option<Outcome> {
    let started = pipeline.begin(expression);
    if started.is_empty() {
        return None;
    }
    emit(events, started);

    let start = Instant::now();
    for step in ProgressSchedule::new(config.tick_interval(), config.progress_step) {
        sleep_until(start + step.offset).await;
        emit(events, pipeline.tick());
    }

    let finished = pipeline.finalize(builder, perturbation);
    let outcome = finished.iter().find_map(|event| match event {
        PipelineEvent::Finished(outcome) => Some(outcome.clone()),
        _ => None,
    });
    emit(events, finished);

    if matches!(outcome, Some(Outcome::Completed(_))) {
        sleep(config.close_delay()).await;
    }
    emit(events, pipeline.close());
    outcome
}
