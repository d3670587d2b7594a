//! Input tokens accepted by the calculator keypad.

use std::fmt;

/// Keypad layout, row by row, as shown on the calculator face.
pub const KEYPAD: [[char; 4]; 4] = [
    ['7', '8', '9', '/'],
    ['4', '5', '6', '*'],
    ['1', '2', '3', '-'],
    ['C', '0', '=', '+'],
];

/// One of the four binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }
}

/// A single atomic input unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// A decimal digit, always in `0..=9`.
    Digit(u8),
    Operator(Operator),
    Clear,
    Equals,
}

impl Token {
    /// Map a typed or clicked character to a token.
    ///
    /// Returns `None` for characters that are not on the keypad.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c as u8 - b'0')),
            '=' => Some(Self::Equals),
            'c' | 'C' => Some(Self::Clear),
            _ => Operator::from_char(c).map(Self::Operator),
        }
    }

    /// Character appended to the expression, for digit and operator tokens.
    pub fn expression_char(self) -> Option<char> {
        match self {
            Self::Digit(d) => char::from_digit(u32::from(d), 10),
            Self::Operator(op) => Some(op.as_char()),
            Self::Clear | Self::Equals => None,
        }
    }

    pub fn is_operator(self) -> bool {
        matches!(self, Self::Operator(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => write!(f, "C"),
            Self::Equals => write!(f, "="),
            other => match other.expression_char() {
                Some(c) => write!(f, "{}", c),
                None => Ok(()),
            },
        }
    }
}

/// A physical key press delivered by the front-end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Return,
}

impl Key {
    /// Translate the key into a token. Unknown keys are ignored.
    pub fn to_token(self) -> Option<Token> {
        match self {
            Self::Enter | Self::Return => Some(Token::Equals),
            Self::Char(c) => Token::from_char(c),
        }
    }
}
