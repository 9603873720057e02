//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows between the tokenizer and the token
//! filters. Filters either rewrite its text or mark it as stopped; stopped
//! tokens are dropped when the analyzer collects its stems.
//!
//! # Examples
//!
//! ```
//! use intent_cascade::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("chrome", 1, 5, 11).with_token_type(TokenType::Word);
//! assert_eq!(token.text, "chrome");
//! assert_eq!(token.start_offset, 5);
//! assert!(!token.is_stopped());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the original token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Whether this token has been marked as stopped (removed) by a filter
    pub stopped: bool,

    /// What kind of segment produced this token
    pub token_type: TokenType,
}

/// Coarse classification of a token's content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    /// Letters, possibly mixed with digits or inner punctuation (`test.txt`)
    Word,
    /// Only numeric characters
    Num,
    /// Only punctuation or symbols
    Punctuation,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        let text = text.into();
        let end_offset = text.len();
        Token {
            text,
            position,
            start_offset: 0,
            end_offset,
            stopped: false,
            token_type: TokenType::Word,
        }
    }

    /// Create a new token with explicit byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
            token_type: TokenType::Word,
        }
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if this token has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Create a copy of this token with different text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        Token {
            text: text.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.text, self.position)
    }
}

/// A stream of tokens flowing through the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello", 0);
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 0);
        assert_eq!(token.end_offset, 5);
        assert_eq!(token.token_type, TokenType::Word);
    }

    #[test]
    fn test_token_stop_and_rewrite() {
        let token = Token::with_offsets("Running", 2, 4, 11).stop();
        assert!(token.is_stopped());

        let rewritten = token.with_text("run");
        assert_eq!(rewritten.text, "run");
        assert_eq!(rewritten.position, 2);
        assert_eq!(rewritten.start_offset, 4);
        assert!(rewritten.is_stopped());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::new("open", 3).to_string(), "open@3");
    }
}
