//! Analyzer implementations that combine tokenizers and filters.

pub mod analyzer;
pub mod intent;
pub mod pipeline;

pub use analyzer::Analyzer;
pub use intent::IntentAnalyzer;
pub use pipeline::PipelineAnalyzer;
