//! Calculator core.
//!
//! This module provides functionality to:
//! - Map keypad characters and keys to input tokens
//! - Build a pending expression from successive tokens
//! - Evaluate expressions with a closed arithmetic grammar
//! - Screen free-form text before it is replayed as key presses

mod builder;
mod detection;
mod evaluation;
mod token;

pub use builder::{Action, BuilderState, ExpressionBuilder, consume_token};
pub use detection::is_token_input;
pub use evaluation::{
    EvalError, EvaluationOutcome, FixedPerturbation, Perturbation, RandomPerturbation, evaluate,
    evaluate_expression, format_result,
};
pub use token::{KEYPAD, Key, Operator, Token};
