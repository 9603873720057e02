//! Unicode word tokenizer implementation.
//!
//! Splits text on Unicode word boundaries (UAX #29). Whitespace segments are
//! dropped; punctuation segments are kept as their own tokens so that a later
//! filter can decide which of them to ignore. Words joined by inner
//! punctuation such as `test.txt` or `example.com` stay whole.
//!
//! # Examples
//!
//! ```
//! use intent_cascade::analysis::tokenizer::Tokenizer;
//! use intent_cascade::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
//!
//! let tokenizer = UnicodeWordTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Move test.txt, please!").unwrap().collect();
//!
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["Move", "test.txt", ",", "please", "!"]);
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer that splits text on Unicode word boundaries and keeps
/// punctuation as separate tokens.
#[derive(Clone, Debug, Default)]
pub struct UnicodeWordTokenizer;

impl UnicodeWordTokenizer {
    /// Create a new Unicode word tokenizer.
    pub fn new() -> Self {
        UnicodeWordTokenizer
    }

    /// Detect token type based on character content.
    fn detect_token_type(segment: &str) -> TokenType {
        if segment.chars().all(|c| c.is_numeric()) {
            TokenType::Num
        } else if segment.chars().all(|c| !c.is_alphanumeric()) {
            TokenType::Punctuation
        } else {
            TokenType::Word
        }
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = text
            .split_word_bound_indices()
            .filter(|(_, segment)| !segment.chars().all(char::is_whitespace))
            .enumerate()
            .map(|(position, (offset, segment))| {
                Token::with_offsets(segment, position, offset, offset + segment.len())
                    .with_token_type(Self::detect_token_type(segment))
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}
