//! Input screening for text fed in outside the keypad.
//!
//! One-shot expressions from the command line are checked here before being
//! replayed as key presses, so stray characters are reported instead of
//! being silently dropped by the key mapping.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Digits and the four operators, optionally separated by spaces.
    static ref KEYPAD_CHARS: Regex = Regex::new(r"^[0-9+\-*/\s]+$").unwrap();
}

/// Check that input consists only of keypad digit and operator characters.
pub fn is_token_input(input: &str) -> bool {
    !input.trim().is_empty() && KEYPAD_CHARS.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_input_accepted() {
        assert!(is_token_input("3+4"));
        assert!(is_token_input("12 * 3 - 4 / 2"));
        assert!(is_token_input("7"));
    }

    #[test]
    fn test_other_input_rejected() {
        assert!(!is_token_input(""));
        assert!(!is_token_input("   "));
        assert!(!is_token_input("3.5+1"));
        assert!(!is_token_input("(3+4)"));
        assert!(!is_token_input("__import__('os')"));
    }
}
