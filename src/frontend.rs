//! Terminal front-end.
//!
//! Stands in for the keypad window: key presses become tokens, pipeline
//! events are rendered as a display line, a progress bar and warnings.

use crate::calculator::{Action, ExpressionBuilder, Key, Perturbation};
use crate::config::Config;
use crate::pipeline::{EvaluationPipeline, Outcome, PipelineEvent, run_evaluation};
use anyhow::{Context, Result};
use flume::Receiver;
use std::io::{BufRead, Write};
use tracing::debug;

const BAR_WIDTH: usize = 20;

pub struct Frontend<W: Write> {
    builder: ExpressionBuilder,
    pipeline: EvaluationPipeline,
    config: Config,
    perturbation: Box<dyn Perturbation>,
    out: W,
}

impl<W: Write> Frontend<W> {
    pub fn new(config: Config, perturbation: Box<dyn Perturbation>, out: W) -> Self {
        Self {
            builder: ExpressionBuilder::new(),
            pipeline: EvaluationPipeline::new(&config),
            config,
            perturbation,
            out,
        }
    }

    pub fn builder(&self) -> &ExpressionBuilder {
        &self.builder
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Handle one key press. Returns the outcome when it triggered an evaluation.
    pub async fn press(&mut self, key: Key) -> Result<Option<Outcome>> {
        let Some(token) = key.to_token() else {
            debug!(?key, "ignoring key");
            return Ok(None);
        };

        match self.builder.dispatch(token) {
            Action::Ignore => Ok(None),
            Action::Redraw => {
                self.draw_display()?;
                Ok(None)
            }
            Action::Evaluate(expression) => self.evaluate(&expression).await,
        }
    }

    /// Replay a line of typed characters. An empty line is Enter.
    pub async fn press_line(&mut self, line: &str) -> Result<Vec<Outcome>> {
        if line.is_empty() {
            return Ok(self.press(Key::Enter).await?.into_iter().collect());
        }
        let mut outcomes = Vec::new();
        for c in line.chars() {
            if let Some(outcome) = self.press(Key::Char(c)).await? {
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }

    /// Read lines until end of input.
    pub async fn run(&mut self, input: impl BufRead) -> Result<()> {
        self.draw_keypad()?;
        for line in input.lines() {
            let line = line.context("failed to read input")?;
            self.press_line(line.trim_end()).await?;
        }
        Ok(())
    }

    async fn evaluate(&mut self, expression: &str) -> Result<Option<Outcome>> {
        let (tx, rx) = flume::unbounded();
        let Self {
            builder,
            pipeline,
            config,
            perturbation,
            out,
        } = self;

        let driver = async {
            let tx = tx;
            run_evaluation(pipeline, builder, expression, config, &mut **perturbation, &tx).await
        };
        let (outcome, rendered) = tokio::join!(driver, render_events(rx, out));
        rendered?;
        Ok(outcome)
    }

    fn draw_display(&mut self) -> Result<()> {
        writeln!(self.out, "> {}", self.builder.current_display())?;
        Ok(())
    }

    fn draw_keypad(&mut self) -> Result<()> {
        for row in crate::calculator::KEYPAD {
            let cells: Vec<String> = row.iter().map(|c| format!("[{}]", c)).collect();
            writeln!(self.out, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

async fn render_events<W: Write>(rx: Receiver<PipelineEvent>, out: &mut W) -> Result<()> {
    let mut status = String::new();
    while let Ok(event) = rx.recv_async().await {
        match event {
            PipelineEvent::Status(text) => status = text,
            PipelineEvent::Progress(value) => writeln!(out, "{}", progress_bar(value, &status))?,
            PipelineEvent::ProgressHidden => writeln!(out, "[{}]", status)?,
            PipelineEvent::Display(text) => writeln!(out, "> {}", text)?,
            PipelineEvent::Finished(outcome) => {
                if let Some(warning) = outcome.warning() {
                    writeln!(out, "warning: {}", warning)?;
                }
            }
            PipelineEvent::Closed => out.flush()?,
        }
    }
    Ok(())
}

fn progress_bar(value: u8, status: &str) -> String {
    let filled = usize::from(value.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        value,
        status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::FixedPerturbation;

    fn frontend(offset: i64) -> Frontend<Vec<u8>> {
        Frontend::new(Config::default(), Box::new(FixedPerturbation(offset)), Vec::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_chained_evaluation() {
        let mut ui = frontend(1);
        let outcomes = ui.press_line("3+4=").await.unwrap();
        assert_eq!(outcomes, vec![Outcome::Completed(8.0)]);
        assert_eq!(ui.builder().current_display(), "8");

        let outcomes = ui.press_line("+2").await.unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(ui.builder().current_display(), "8+2");

        let outcomes = ui.press_line("").await.unwrap();
        assert_eq!(outcomes, vec![Outcome::Completed(11.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_digit_after_result_starts_fresh() {
        let mut ui = frontend(1);
        ui.press_line("3+4=").await.unwrap();
        ui.press_line("5").await.unwrap();
        assert_eq!(ui.builder().current_display(), "5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_is_rendered_and_expression_kept() {
        let mut ui = frontend(1);
        let outcomes = ui.press_line("3/0=").await.unwrap();
        assert_eq!(
            outcomes,
            vec![Outcome::Error("evaluation error: division by zero".into())]
        );
        assert_eq!(ui.builder().expression(), "3/0");

        let output = String::from_utf8(ui.into_output()).unwrap();
        assert!(output.contains("warning: evaluation error: division by zero"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_rendered_for_each_tick() {
        let mut ui = frontend(2);
        ui.press_line("1+1=").await.unwrap();
        let output = String::from_utf8(ui.into_output()).unwrap();
        assert!(output.contains(" 10% processing"));
        assert!(output.contains("100% computation complete"));
        assert!(output.contains("> 4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_and_unknown_keys() {
        let mut ui = frontend(1);
        ui.press_line("12x3").await.unwrap();
        assert_eq!(ui.builder().current_display(), "123");
        ui.press(Key::Char('C')).await.unwrap();
        assert_eq!(ui.builder().current_display(), "");
        assert_eq!(ui.press(Key::Return).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reads_lines() {
        let mut ui = frontend(3);
        ui.run(std::io::Cursor::new("2*3\n\n")).await.unwrap();
        assert_eq!(ui.builder().current_display(), "9");
        assert!(ui.builder().is_fresh_result());
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(
            progress_bar(50, "processing"),
            format!("[{}{}]  50% processing", "#".repeat(10), " ".repeat(10))
        );
    }
}
