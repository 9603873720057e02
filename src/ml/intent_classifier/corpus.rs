//! Training corpus: named intents with example phrases.
//!
//! The on-disk shape is the usual chatbot layout:
//!
//! ```json
//! { "intents": [ { "tag": "weather", "patterns": ["Is it raining"], "responses": [] } ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IntentError, Result};

/// Corpus compiled into the binary.
const BUILTIN_CORPUS: &str = include_str!("../../../data/intents.json");

/// One intent and the phrases that express it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub tag: String,
    pub patterns: Vec<String>,
    /// Canned replies; carried along but never used for training.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<String>,
}

impl IntentDefinition {
    pub fn new<S: Into<String>>(tag: S, patterns: &[&str]) -> Self {
        IntentDefinition {
            tag: tag.into(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            responses: Vec::new(),
        }
    }
}

/// A whole training corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    pub intents: Vec<IntentDefinition>,
}

impl Corpus {
    pub fn new(intents: Vec<IntentDefinition>) -> Self {
        Corpus { intents }
    }

    /// The corpus bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CORPUS)
    }

    /// Parse and validate a corpus from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let corpus: Corpus = serde_json::from_str(json)
            .map_err(|e| IntentError::corpus(format!("Malformed corpus: {e}")))?;
        corpus.validate()?;
        Ok(corpus)
    }

    /// Load and validate a corpus from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IntentError::corpus(format!("Failed to read corpus {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Reject corpora that cannot produce a classifier.
    pub fn validate(&self) -> Result<()> {
        if self.intents.is_empty() {
            return Err(IntentError::corpus("corpus contains no intents"));
        }

        for (i, intent) in self.intents.iter().enumerate() {
            if intent.tag.trim().is_empty() {
                return Err(IntentError::corpus(format!("intent #{i} has an empty tag")));
            }
            if intent.patterns.is_empty() {
                return Err(IntentError::corpus(format!(
                    "intent #{i} ({:?}) has no patterns",
                    intent.tag
                )));
            }
            if let Some(j) = intent.patterns.iter().position(|p| p.trim().is_empty()) {
                return Err(IntentError::corpus(format!(
                    "intent #{i} ({:?}) has an empty pattern at position {j}",
                    intent.tag
                )));
            }
        }

        Ok(())
    }

    /// Number of phrases across all intents.
    pub fn phrase_count(&self) -> usize {
        self.intents.iter().map(|i| i.patterns.len()).sum()
    }

    /// Iterate `(tag, phrase)` pairs in corpus order.
    pub fn phrases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.intents.iter().flat_map(|intent| {
            intent
                .patterns
                .iter()
                .map(move |p| (intent.tag.as_str(), p.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_corpus_is_valid() {
        let corpus = Corpus::builtin().unwrap();
        assert!(corpus.intents.len() > 10);
        assert!(corpus.intents.iter().any(|i| i.tag == "complex_media"));
        assert!(corpus.intents.iter().any(|i| i.tag == "weather"));
    }

    #[test]
    fn test_responses_are_optional() {
        let corpus =
            Corpus::from_json_str(r#"{"intents":[{"tag":"greet","patterns":["hi"]}]}"#).unwrap();
        assert_eq!(corpus.intents[0].responses.len(), 0);
        assert_eq!(corpus.phrase_count(), 1);
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        assert!(Corpus::from_json_str(r#"{"intents":[{"patterns":["hi"]}]}"#).is_err());
        assert!(Corpus::from_json_str(r#"{"intents":[{"tag":"greet"}]}"#).is_err());
        assert!(Corpus::from_json_str("not json").is_err());
    }

    #[test]
    fn test_validation_errors() {
        let empty = Corpus::default();
        assert!(matches!(empty.validate(), Err(IntentError::Corpus(_))));

        let no_tag = Corpus::new(vec![IntentDefinition::new("  ", &["hi"])]);
        assert!(no_tag.validate().unwrap_err().to_string().contains("empty tag"));

        let no_patterns = Corpus::new(vec![IntentDefinition::new("greet", &[])]);
        assert!(no_patterns.validate().unwrap_err().to_string().contains("no patterns"));

        let blank_pattern = Corpus::new(vec![IntentDefinition::new("greet", &["hi", " "])]);
        assert!(blank_pattern.validate().is_err());
    }

    #[test]
    fn test_phrases_in_corpus_order() {
        let corpus = Corpus::new(vec![
            IntentDefinition::new("b", &["one", "two"]),
            IntentDefinition::new("a", &["three"]),
        ]);
        let phrases: Vec<_> = corpus.phrases().collect();
        assert_eq!(phrases, vec![("b", "one"), ("b", "two"), ("a", "three")]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("intents.json");
        std::fs::write(&path, r#"{"intents":[{"tag":"greet","patterns":["hello"]}]}"#).unwrap();

        let corpus = Corpus::from_file(&path).unwrap();
        assert_eq!(corpus.intents[0].tag, "greet");

        assert!(Corpus::from_file(dir.path().join("missing.json")).is_err());
    }
}
