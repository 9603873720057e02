//! Analyzer used for intent features.
//!
//! # Pipeline
//!
//! 1. UnicodeWordTokenizer (punctuation kept as separate tokens)
//! 2. IgnoreFilter (`?`, `!`, `.`, `,`)
//! 3. LowercaseFilter
//! 4. StemFilter (Lancaster unless another stemmer is injected)
//!
//! # Examples
//!
//! ```
//! use intent_cascade::analysis::analyzer::analyzer::Analyzer;
//! use intent_cascade::analysis::analyzer::intent::IntentAnalyzer;
//!
//! let analyzer = IntentAnalyzer::new();
//! assert_eq!(analyzer.stems("Running chrome?").unwrap(), vec!["run", "chrome"]);
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::ignore::IgnoreFilter;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::stem::{LancasterStemmer, StemFilter, Stemmer};
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::error::Result;

/// The analyzer shared by vocabulary building and inference.
#[derive(Clone)]
pub struct IntentAnalyzer {
    inner: PipelineAnalyzer,
    stemmer_name: &'static str,
}

impl IntentAnalyzer {
    /// Create an analyzer with the Lancaster stemmer.
    pub fn new() -> Self {
        Self::with_stemmer(Arc::new(LancasterStemmer::new()))
    }

    /// Create an analyzer with an injected stemmer.
    pub fn with_stemmer(stemmer: Arc<dyn Stemmer>) -> Self {
        let stemmer_name = stemmer.name();
        let inner = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_filter(Arc::new(IgnoreFilter::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StemFilter::with_stemmer(stemmer)))
            .with_name(format!("intent_{stemmer_name}"));

        IntentAnalyzer {
            inner,
            stemmer_name,
        }
    }

    /// Name of the injected stemmer.
    pub fn stemmer_name(&self) -> &'static str {
        self.stemmer_name
    }

    /// Get the inner pipeline analyzer.
    pub fn inner(&self) -> &PipelineAnalyzer {
        &self.inner
    }
}

impl Default for IntentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for IntentAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "intent"
    }
}

impl std::fmt::Debug for IntentAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentAnalyzer")
            .field("inner", &self.inner)
            .finish()
    }
}
