//! Error types for intent recognition.
//!
//! All fallible library operations return [`IntentError`]. Model loading has
//! its own [`ModelLoadError`] so callers can tell a missing model apart from a
//! corrupt or mismatched one; the arbiter never sees either of them.
//!
//! # Examples
//!
//! ```
//! use intent_cascade::error::{IntentError, Result};
//!
//! fn validate(tag: &str) -> Result<()> {
//!     if tag.is_empty() {
//!         return Err(IntentError::corpus("intent tag must not be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate("").is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for intent recognition operations.
#[derive(Error, Debug)]
pub enum IntentError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Malformed training corpus
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Invalid pattern rule
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Training could not run
    #[error("Training error: {0}")]
    Training(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Model could not be loaded
    #[error("Model error: {0}")]
    Model(#[from] ModelLoadError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with IntentError.
pub type Result<T> = std::result::Result<T, IntentError>;

impl IntentError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        IntentError::Analysis(msg.into())
    }

    /// Create a new corpus error.
    pub fn corpus<S: Into<String>>(msg: S) -> Self {
        IntentError::Corpus(msg.into())
    }

    /// Create a new pattern error.
    pub fn pattern<S: Into<String>>(msg: S) -> Self {
        IntentError::Pattern(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        IntentError::Training(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        IntentError::Storage(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        IntentError::Serialization(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        IntentError::InvalidConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        IntentError::Other(msg.into())
    }
}

/// Why a persisted model was rejected.
///
/// A classifier that sees any of these stays untrained.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelLoadError {
    /// No model has been published under the given name.
    #[error("model not found: {0}")]
    NotFound(String),

    /// The bytes are truncated, fail the checksum or do not decode.
    #[error("corrupt model: {0}")]
    Corrupt(String),

    /// The blob was written by a format version this build cannot read.
    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    /// Weight matrices disagree with the vocabulary or class list.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}
