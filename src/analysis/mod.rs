//! Text analysis for intent features.
//!
//! Utterances and training phrases go through the same pipeline before they
//! become bag-of-words features:
//!
//! ```text
//! Raw Text → Tokenizer → IgnoreFilter → LowercaseFilter → StemFilter → stems
//! ```
//!
//! Training and inference must use the same pipeline or vocabulary columns
//! will not line up.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::*;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
