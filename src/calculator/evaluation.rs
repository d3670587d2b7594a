//! Expression evaluation.
//!
//! A small closed-grammar evaluator for flat arithmetic over decimal numbers
//! and the four basic operators. Nothing outside that grammar is ever
//! interpreted:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | number
//! number := digit+ ('.' digit*)? | '.' digit+
//! ```

use super::token::Operator;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Why an expression failed to produce a value.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    /// The expression cannot be parsed.
    #[error("invalid expression: {0}")]
    Syntax(String),
    /// The expression parsed but failed while computing.
    #[error("{0}")]
    Runtime(String),
}

/// Result of a single evaluation attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum EvaluationOutcome {
    /// Perturbed value within capacity.
    Success(f64),
    /// Perturbed value above the capacity ceiling.
    CapacityExceeded(f64),
    SyntaxInvalid,
    RuntimeError(String),
}

/// Source of the offset added to every computed result.
pub trait Perturbation {
    fn sample(&mut self) -> i64;
}

/// Uniform draw from an inclusive integer range.
#[derive(Clone, Copy, Debug)]
pub struct RandomPerturbation {
    min: i64,
    max: i64,
}

impl RandomPerturbation {
    /// Panics in `sample` if `min > max`; config validation rejects that case.
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl Default for RandomPerturbation {
    fn default() -> Self {
        Self::new(1, 3)
    }
}

impl Perturbation for RandomPerturbation {
    fn sample(&mut self) -> i64 {
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

/// Always yields the same offset.
#[derive(Clone, Copy, Debug)]
pub struct FixedPerturbation(pub i64);

impl Perturbation for FixedPerturbation {
    fn sample(&mut self) -> i64 {
        self.0
    }
}

/// Evaluate `expression`, perturb the value and apply the capacity ceiling.
pub fn evaluate(
    expression: &str,
    perturbation: &mut dyn Perturbation,
    ceiling: f64,
) -> EvaluationOutcome {
    let value = match evaluate_expression(expression) {
        Ok(value) => value,
        Err(EvalError::Syntax(reason)) => {
            debug!(expression, %reason, "syntax error");
            return EvaluationOutcome::SyntaxInvalid;
        }
        Err(EvalError::Runtime(message)) => return EvaluationOutcome::RuntimeError(message),
    };

    let perturbed = value + perturbation.sample() as f64;
    if perturbed > ceiling {
        debug!(expression, perturbed, ceiling, "result over capacity");
        EvaluationOutcome::CapacityExceeded(perturbed)
    } else if perturbed.is_finite() {
        EvaluationOutcome::Success(perturbed)
    } else {
        // Negative overflow has no displayable value.
        EvaluationOutcome::RuntimeError("result is not a finite number".into())
    }
}

/// Evaluate an arithmetic expression exactly, without perturbation.
///
/// Overflow yields an infinite value; only undefined results such as
/// `inf - inf` are errors.
pub fn evaluate_expression(input: &str) -> Result<f64, EvalError> {
    let lexemes = tokenize(input)?;
    let mut parser = Parser {
        lexemes: &lexemes,
        pos: 0,
    };
    let value = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(EvalError::Syntax(format!("unexpected {}", extra)));
    }
    if value.is_nan() {
        return Err(EvalError::Runtime("result is not a number".into()));
    }
    Ok(value)
}

/// Format a value the way the display shows it.
///
/// Integral values drop the fractional part; others keep up to ten decimals
/// with trailing zeros trimmed.
pub fn format_result(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let formatted = format!("{:.10}", value);
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Lexeme {
    Number(f64),
    Op(Operator),
}

impl std::fmt::Display for Lexeme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {}", n),
            Self::Op(op) => write!(f, "'{}'", op.as_char()),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Lexeme>, EvalError> {
    let mut lexemes = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if let Some(op) = Operator::from_char(c) {
            lexemes.push(Lexeme::Op(op));
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut end = start;
            let mut seen_dot = false;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_digit() || (d == '.' && !seen_dot) {
                    seen_dot |= d == '.';
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let literal = &input[start..end];
            if is_padded_integer(literal) {
                return Err(EvalError::Syntax(format!("leading zero in '{}'", literal)));
            }
            let number = literal
                .parse::<f64>()
                .map_err(|_| EvalError::Syntax(format!("bad number '{}'", literal)))?;
            lexemes.push(Lexeme::Number(number));
        } else {
            return Err(EvalError::Syntax(format!("unexpected character '{}'", c)));
        }
    }

    Ok(lexemes)
}

/// Integer literals like `08`; all-zero runs and decimals are fine.
fn is_padded_integer(literal: &str) -> bool {
    literal.len() > 1
        && literal.starts_with('0')
        && !literal.contains('.')
        && literal.bytes().any(|b| b != b'0')
}

struct Parser<'a> {
    lexemes: &'a [Lexeme],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Lexeme> {
        self.lexemes.get(self.pos).copied()
    }

    fn next_op(&mut self, level: u8) -> Option<Operator> {
        match self.peek() {
            Some(Lexeme::Op(op)) if op.precedence() == level => {
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.term()?;
        while let Some(op) = self.next_op(1) {
            let rhs = self.term()?;
            acc = apply(op, acc, rhs)?;
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.unary()?;
        while let Some(op) = self.next_op(2) {
            let rhs = self.unary()?;
            acc = apply(op, acc, rhs)?;
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some(Lexeme::Op(Operator::Sub)) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Lexeme::Op(Operator::Add)) => {
                self.pos += 1;
                self.unary()
            }
            Some(Lexeme::Number(n)) => {
                self.pos += 1;
                Ok(n)
            }
            Some(other) => Err(EvalError::Syntax(format!("unexpected {}", other))),
            None => Err(EvalError::Syntax("missing operand".into())),
        }
    }
}

fn apply(op: Operator, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    match op {
        Operator::Add => Ok(lhs + rhs),
        Operator::Sub => Ok(lhs - rhs),
        Operator::Mul => Ok(lhs * rhs),
        Operator::Div if rhs == 0.0 => Err(EvalError::Runtime("division by zero".into())),
        Operator::Div => Ok(lhs / rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_evaluation() {
        assert_eq!(evaluate_expression("3+4"), Ok(7.0));
        assert_eq!(evaluate_expression("2+3*4"), Ok(14.0));
        assert_eq!(evaluate_expression("20-4/2"), Ok(18.0));
        assert_eq!(evaluate_expression("8-3-2"), Ok(3.0));
        assert_eq!(evaluate_expression("7/2"), Ok(3.5));
    }

    #[test]
    fn test_unary_and_decimal_operands() {
        assert_eq!(evaluate_expression("-5+2"), Ok(-3.0));
        assert_eq!(evaluate_expression("3--3"), Ok(6.0));
        assert_eq!(evaluate_expression("3*-2"), Ok(-6.0));
        assert_eq!(evaluate_expression("5.5+2"), Ok(7.5));
    }

    #[test]
    fn test_syntax_errors() {
        for bad in ["3+", "", "*3", "3+*4", "3//3", "1.2.3", "2x3", "3**2"] {
            assert!(
                matches!(evaluate_expression(bad), Err(EvalError::Syntax(_))),
                "{:?} should be a syntax error",
                bad
            );
        }
    }

    #[test]
    fn test_division_by_zero_is_runtime_error() {
        assert_eq!(
            evaluate_expression("3/0"),
            Err(EvalError::Runtime("division by zero".into()))
        );
        assert_eq!(
            evaluate("3/0", &mut FixedPerturbation(1), 250.0),
            EvaluationOutcome::RuntimeError("division by zero".into())
        );
    }

    #[test]
    fn test_trailing_operator_outcome() {
        assert_eq!(
            evaluate("3+", &mut FixedPerturbation(1), 250.0),
            EvaluationOutcome::SyntaxInvalid
        );
    }

    #[test]
    fn test_perturbation_range() {
        let mut perturbation = RandomPerturbation::default();
        for _ in 0..200 {
            match evaluate("3+4", &mut perturbation, 250.0) {
                EvaluationOutcome::Success(v) => assert!([8.0, 9.0, 10.0].contains(&v)),
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }

    #[test]
    fn test_capacity_boundary() {
        let mut fixed = FixedPerturbation(3);
        assert_eq!(
            evaluate("248", &mut fixed, 250.0),
            EvaluationOutcome::CapacityExceeded(251.0)
        );
        assert_eq!(evaluate("247", &mut fixed, 250.0), EvaluationOutcome::Success(250.0));
        assert_eq!(
            evaluate("200+48", &mut fixed, 250.0),
            EvaluationOutcome::CapacityExceeded(251.0)
        );
    }

    #[test]
    fn test_overflow_exceeds_capacity() {
        let mut fixed = FixedPerturbation(1);
        let huge = "9".repeat(310);
        assert!(matches!(
            evaluate(&huge, &mut fixed, 250.0),
            EvaluationOutcome::CapacityExceeded(v) if v.is_infinite()
        ));

        let product = format!("{}*{}", "9".repeat(160), "9".repeat(160));
        assert!(matches!(
            evaluate(&product, &mut fixed, 250.0),
            EvaluationOutcome::CapacityExceeded(_)
        ));

        let negative = format!("0-{}", huge);
        assert_eq!(
            evaluate(&negative, &mut fixed, 250.0),
            EvaluationOutcome::RuntimeError("result is not a finite number".into())
        );

        let undefined = format!("{}-{}", huge, huge);
        assert_eq!(
            evaluate(&undefined, &mut fixed, 250.0),
            EvaluationOutcome::RuntimeError("result is not a number".into())
        );
    }

    #[test]
    fn test_leading_zero_literals() {
        assert!(matches!(evaluate_expression("08+1"), Err(EvalError::Syntax(_))));
        assert!(matches!(evaluate_expression("3*007"), Err(EvalError::Syntax(_))));
        assert_eq!(
            evaluate("08+1", &mut FixedPerturbation(1), 250.0),
            EvaluationOutcome::SyntaxInvalid
        );
        assert_eq!(evaluate_expression("0+8"), Ok(8.0));
        assert_eq!(evaluate_expression("00+1"), Ok(1.0));
        assert_eq!(evaluate_expression("0.5*2"), Ok(1.0));
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(8.0), "8");
        assert_eq!(format_result(-5.0), "-5");
        assert_eq!(format_result(5.5), "5.5");
        assert!(format_result(1.0 / 3.0).starts_with("0.333"));
    }
}
