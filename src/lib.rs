//! # intent-cascade
//!
//! Intent recognition for voice and text assistants.
//!
//! An utterance goes through three stages, always in this order:
//!
//! 1. a priority-ordered table of regular expressions, which wins outright
//!    with confidence 1.0 and structured entities,
//! 2. a small bag-of-words neural network trained on a corpus of example
//!    phrases, used when it is confident enough,
//! 3. a `query` fallback carrying the text itself.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Pluggable stemming for the bag-of-words features
//! - Versioned, checksummed model persistence with atomic publish
//! - Lock-free-for-readers model swaps on retrain
//! - Typed action parameters with a flat entity map for JSON consumers

pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod intent;
pub mod ml;
pub mod storage;

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::IntentEngine;
    pub use crate::error::{IntentError, ModelLoadError, Result};
    pub use crate::intent::{Action, ArbiterConfig, EntityValue, Intent, IntentArbiter};
    pub use crate::ml::intent_classifier::{Corpus, IntentClassifier, TrainingConfig};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
