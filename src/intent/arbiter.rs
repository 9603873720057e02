//! The recognition cascade.
//!
//! ```text
//! text → normalize → PatternMatcher ──hit──→ structured entities, confidence 1.0
//!                         │ miss
//!                         ▼
//!                    IntentClassifier ──confidence > threshold──→ heuristic entities
//!                         │ otherwise
//!                         ▼
//!                    query fallback, confidence 0.5
//! ```
//!
//! The order never changes and [`IntentArbiter::recognize`] always returns
//! a well-formed [`Intent`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IntentError, Result};
use crate::intent::action::{Action, ActionParams, Entities, EntityValue};
use crate::intent::entity::{EntityExtractor, resolve_label};
use crate::intent::pattern::PatternMatcher;
use crate::ml::intent_classifier::IntentClassifier;

/// Confidence reported for a pattern hit.
pub const PATTERN_CONFIDENCE: f64 = 1.0;

/// Which stage of the cascade produced an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentSource {
    Pattern,
    Classifier,
    #[default]
    Fallback,
}

impl IntentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentSource::Pattern => "pattern",
            IntentSource::Classifier => "classifier",
            IntentSource::Fallback => "fallback",
        }
    }
}

/// A recognised intent, as handed to downstream executors.
///
/// Serialises to `{action, entities, confidence, raw_text}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    action: Action,
    entities: Entities,
    confidence: f64,
    raw_text: String,
    #[serde(skip)]
    params: ActionParams,
    #[serde(skip)]
    source: IntentSource,
}

impl Intent {
    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    /// Look up a single entity.
    pub fn entity(&self, name: &str) -> Option<&EntityValue> {
        self.entities.get(name)
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// The normalised text the intent was recognised from.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Typed parameters. Empty for intents decoded from JSON.
    pub fn params(&self) -> &ActionParams {
        &self.params
    }

    pub fn source(&self) -> IntentSource {
        self.source
    }

    /// Whether downstream executors have a handler for the action.
    pub fn is_handled(&self) -> bool {
        !self.action.is_custom()
    }
}

/// Thresholds of the cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// A classifier prediction must be strictly above this to be used.
    pub confidence_threshold: f64,
    /// Confidence reported for the query fallback.
    pub fallback_confidence: f64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        ArbiterConfig {
            confidence_threshold: 0.7,
            fallback_confidence: 0.5,
        }
    }
}

impl ArbiterConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("fallback_confidence", self.fallback_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(IntentError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Runs the pattern table, the classifier and the fallback in order.
#[derive(Clone)]
pub struct IntentArbiter {
    matcher: PatternMatcher,
    extractor: EntityExtractor,
    classifier: Option<Arc<dyn IntentClassifier>>,
    config: ArbiterConfig,
}

impl IntentArbiter {
    /// Arbiter with the built-in pattern table and no classifier.
    pub fn new(config: ArbiterConfig) -> Self {
        IntentArbiter {
            matcher: PatternMatcher::new(),
            extractor: EntityExtractor::new(),
            classifier: None,
            config,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_matcher(mut self, matcher: PatternMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    /// Classify `text`. Never fails.
    pub fn recognize(&self, text: &str) -> Intent {
        let text = normalize(text);

        let intent = self
            .from_pattern(&text)
            .or_else(|| self.from_classifier(&text))
            .unwrap_or_else(|| self.fallback(text));

        info!(
            action = %intent.action,
            source = intent.source.as_str(),
            confidence = intent.confidence,
            "intent recognised"
        );
        intent
    }

    fn from_pattern(&self, text: &str) -> Option<Intent> {
        let hit = self.matcher.find(text)?;
        debug!(action = %hit.action, pattern = %hit.pattern, "pattern matched");

        let params = self.extractor.structured(&hit, text);
        Some(Intent {
            action: hit.action,
            entities: params.to_entities(),
            confidence: PATTERN_CONFIDENCE,
            raw_text: text.to_string(),
            params,
            source: IntentSource::Pattern,
        })
    }

    fn from_classifier(&self, text: &str) -> Option<Intent> {
        let classifier = self.classifier.as_ref()?;
        let prediction = classifier.classify(text)?;
        debug!(
            classifier = classifier.name(),
            label = %prediction.label,
            confidence = prediction.confidence,
            "classifier prediction"
        );

        if !prediction.is_valid() || prediction.confidence <= self.config.confidence_threshold {
            debug!(
                threshold = self.config.confidence_threshold,
                "prediction below threshold"
            );
            return None;
        }

        let action = resolve_label(&prediction.label, text);
        let (params, entities) = self.extractor.heuristic_entities(&action, text);
        Some(Intent {
            action,
            entities,
            confidence: prediction.confidence,
            raw_text: text.to_string(),
            params,
            source: IntentSource::Classifier,
        })
    }

    fn fallback(&self, text: String) -> Intent {
        debug!("no pattern or confident prediction, falling back to query");
        let params = ActionParams::Query {
            query: Some(text.clone()),
        };
        Intent {
            action: Action::Query,
            entities: params.to_entities(),
            confidence: self.config.fallback_confidence,
            raw_text: text,
            params,
            source: IntentSource::Fallback,
        }
    }
}

impl Default for IntentArbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

impl std::fmt::Debug for IntentArbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentArbiter")
            .field("rules", &self.matcher.len())
            .field("classifier", &self.classifier.as_ref().map(|c| c.name()))
            .field("config", &self.config)
            .finish()
    }
}

/// Lowercase and trim.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
