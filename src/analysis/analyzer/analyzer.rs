//! Core analyzer trait definition.
//!
//! An [`Analyzer`] is the whole text-processing pipeline: a tokenizer followed
//! by a chain of filters. The feature builder only ever talks to this trait,
//! so the stemming strategy and the punctuation policy are both injected.
//!
//! # Examples
//!
//! ```
//! use intent_cascade::analysis::analyzer::analyzer::Analyzer;
//! use intent_cascade::analysis::token::TokenStream;
//! use intent_cascade::error::Result;
//!
//! struct WhitespaceOnly;
//!
//! impl Analyzer for WhitespaceOnly {
//!     fn analyze(&self, text: &str) -> Result<TokenStream> {
//!         use intent_cascade::analysis::token::Token;
//!         let tokens: Vec<Token> = text
//!             .split_whitespace()
//!             .enumerate()
//!             .map(|(i, w)| Token::new(w, i))
//!             .collect();
//!         Ok(Box::new(tokens.into_iter()))
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "whitespace_only"
//!     }
//! }
//!
//! let stems = WhitespaceOnly.stems("open chrome").unwrap();
//! assert_eq!(stems, vec!["open", "chrome"]);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Analyze text and collect the text of every token that survived the
    /// pipeline, in order.
    fn stems(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .analyze(text)?
            .filter(|token| !token.is_stopped())
            .map(|token| token.text)
            .collect())
    }
}
