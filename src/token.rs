use crate::error::{GrammarError, Result};
use std::fmt;

/// An atomic unit of the input string.
///
/// Carries its value and the position it had in the original token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    value: String,
    position: usize,
}

impl Token {
    pub fn new(value: impl Into<String>, position: usize) -> Self {
        Self {
            value: value.into(),
            position,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Position of this token in the original input.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Splits a space-separated string into positioned tokens.
///
/// Only the space character separates tokens, and runs of spaces count as a
/// single separator. Tabs and newlines stay inside their token. Fails with
/// [`GrammarError::InvalidInput`] when no token is found.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let tokens: Vec<Token> = input
        .split(' ')
        .filter(|value| !value.is_empty())
        .enumerate()
        .map(|(position, value)| Token::new(value, position))
        .collect();

    if tokens.is_empty() {
        return Err(GrammarError::InvalidInput);
    }

    Ok(tokens)
}
