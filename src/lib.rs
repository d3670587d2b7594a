//! A redstone-computer themed keypad calculator.
//!
//! Key presses build a flat arithmetic expression; pressing equals runs it
//! through a staged, deliberately slow "processing" pipeline before the
//! (slightly lossy) result is shown.

pub mod calculator;
pub mod config;
pub mod frontend;
pub mod pipeline;
