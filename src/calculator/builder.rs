//! Expression construction state machine.
//!
//! Keypad tokens mutate a pending expression string and a fresh-result flag.
//! The transition is a pure function over [`BuilderState`] so it can be
//! exercised without any front-end; [`ExpressionBuilder`] wraps it for callers
//! that prefer a mutable handle.

use super::token::Token;
use tracing::debug;

/// Snapshot of the builder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuilderState {
    /// Pending expression, only keypad characters.
    pub expression: String,
    /// Text shown in the read-only display field.
    pub display: String,
    /// Set right after a completed evaluation, while the display holds its result.
    pub fresh_result: bool,
}

/// What the front-end should do after dispatching a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// The display changed (or may have); redraw it.
    Redraw,
    /// Hand this expression to the evaluation pipeline.
    Evaluate(String),
    /// Equals was pressed with nothing to evaluate.
    Ignore,
}

/// Apply one digit or operator token.
///
/// `Clear` resets the state; `Equals` leaves it unchanged since finalizing is
/// the pipeline's job.
pub fn consume_token(mut state: BuilderState, token: Token) -> BuilderState {
    let c = match token {
        Token::Clear => return BuilderState::default(),
        Token::Equals => return state,
        other => match other.expression_char() {
            Some(c) => c,
            None => return state,
        },
    };

    if state.fresh_result {
        if token.is_operator() {
            // Continue from the shown result as the left operand.
            if !state.display.is_empty() {
                state.expression = format!("{}{}", state.display, c);
            }
        } else {
            state.expression = c.to_string();
        }
        state.fresh_result = false;
    } else {
        state.expression.push(c);
    }

    state.display = state.expression.clone();
    state
}

/// Mutable wrapper around [`BuilderState`].
#[derive(Clone, Debug, Default)]
pub struct ExpressionBuilder {
    state: BuilderState,
}

impl ExpressionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a digit or operator and return the updated display text.
    pub fn consume_token(&mut self, token: Token) -> &str {
        let state = std::mem::take(&mut self.state);
        self.state = consume_token(state, token);
        debug!(%token, expression = %self.state.expression, "token consumed");
        &self.state.display
    }

    /// Route any token, including `Clear` and `Equals`.
    pub fn dispatch(&mut self, token: Token) -> Action {
        match token {
            Token::Equals if self.state.expression.is_empty() => Action::Ignore,
            Token::Equals => Action::Evaluate(self.state.expression.clone()),
            Token::Clear => {
                self.clear();
                Action::Redraw
            }
            other => {
                self.consume_token(other);
                Action::Redraw
            }
        }
    }

    /// Reset expression and display; idempotent.
    pub fn clear(&mut self) {
        self.state = BuilderState::default();
    }

    /// Show a completed result and arm the fresh-result flag.
    pub fn commit_result(&mut self, text: impl Into<String>) {
        self.state.display = text.into();
        self.state.expression.clear();
        self.state.fresh_result = true;
    }

    pub fn current_display(&self) -> &str {
        &self.state.display
    }

    pub fn expression(&self) -> &str {
        &self.state.expression
    }

    pub fn is_fresh_result(&self) -> bool {
        self.state.fresh_result
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }
}
