//! Ignore filter implementation.
//!
//! Drops punctuation tokens that carry no intent signal. The default set is
//! `?`, `!`, `.` and `,`; anything else, including unknown symbols, is kept
//! and simply never matches a vocabulary column unless it was in the corpus.
//!
//! # Examples
//!
//! ```
//! use intent_cascade::analysis::token_filter::Filter;
//! use intent_cascade::analysis::token_filter::ignore::IgnoreFilter;
//! use intent_cascade::analysis::token::Token;
//!
//! let filter = IgnoreFilter::new();
//! let tokens = vec![Token::new("lock", 0), Token::new("it", 1), Token::new("!", 2)];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[1].text, "it");
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Tokens that are dropped before stemming.
pub const DEFAULT_IGNORED_TOKENS: &[&str] = &["?", "!", ".", ","];

static DEFAULT_IGNORED_TOKENS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_IGNORED_TOKENS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// A filter that removes ignorable tokens from the stream.
#[derive(Clone, Debug)]
pub struct IgnoreFilter {
    /// The set of tokens to drop
    ignored: Arc<HashSet<String>>,
    /// Whether to remove ignored tokens entirely or just mark them as stopped
    remove_ignored: bool,
}

impl IgnoreFilter {
    /// Create a filter with the default punctuation set.
    pub fn new() -> Self {
        Self::with_tokens(DEFAULT_IGNORED_TOKENS_SET.clone())
    }

    /// Create a filter with a custom set of ignored tokens.
    pub fn with_tokens(ignored: HashSet<String>) -> Self {
        IgnoreFilter {
            ignored: Arc::new(ignored),
            remove_ignored: true,
        }
    }

    /// Create a filter from a list of ignored tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_tokens(tokens.into_iter().map(|s| s.into()).collect())
    }

    /// Keep ignored tokens in the stream, marked as stopped.
    pub fn remove_ignored(mut self, remove: bool) -> Self {
        self.remove_ignored = remove;
        self
    }

    /// Check whether a token text is ignored.
    pub fn is_ignored(&self, text: &str) -> bool {
        self.ignored.contains(text)
    }

    /// Number of ignored tokens.
    pub fn len(&self) -> usize {
        self.ignored.len()
    }

    /// Whether the ignore set is empty.
    pub fn is_empty(&self) -> bool {
        self.ignored.is_empty()
    }
}

impl Default for IgnoreFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for IgnoreFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = if self.remove_ignored {
            tokens.filter(|token| !self.is_ignored(&token.text)).collect()
        } else {
            tokens
                .map(|token| {
                    if self.is_ignored(&token.text) {
                        token.stop()
                    } else {
                        token
                    }
                })
                .collect()
        };

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "ignore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(words: &[&str]) -> TokenStream {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        Box::new(tokens.into_iter())
    }

    #[test]
    fn test_default_set() {
        let filter = IgnoreFilter::new();
        assert_eq!(filter.len(), 4);
        assert!(filter.is_ignored("?"));
        assert!(filter.is_ignored(","));
        assert!(!filter.is_ignored("-"));
    }

    #[test]
    fn test_removes_ignored_tokens() {
        let filter = IgnoreFilter::new();
        let result: Vec<Token> = filter
            .filter(stream(&["is", "it", "raining", "?", "!"]))
            .unwrap()
            .collect();

        let texts: Vec<&str> = result.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["is", "it", "raining"]);
    }

    #[test]
    fn test_marks_instead_of_removing() {
        let filter = IgnoreFilter::from_tokens(vec!["?"]).remove_ignored(false);
        let result: Vec<Token> = filter.filter(stream(&["why", "?"])).unwrap().collect();

        assert_eq!(result.len(), 2);
        assert!(!result[0].is_stopped());
        assert!(result[1].is_stopped());
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(IgnoreFilter::new().name(), "ignore");
    }
}
