//! Intent classifier trait and the neural implementation.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::core::train_model;
use super::corpus::Corpus;
use super::model::{Model, ModelStore};
use super::network::{TrainingConfig, TrainingReport};
use super::types::Prediction;
use super::vocabulary::FeatureBuilder;
use crate::error::{ModelLoadError, Result};

/// Intent classifier trait.
///
/// Implementations map an utterance to a label and a confidence. Returning
/// `None` means "no opinion", which the arbiter treats like a low score.
pub trait IntentClassifier: Send + Sync {
    /// Predict the intent for a given utterance.
    fn classify(&self, text: &str) -> Option<Prediction>;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}

/// Bag-of-words network classifier with a swappable model snapshot.
///
/// Starts untrained. Training or loading installs a model; inference clones
/// the current `Arc<Model>` and never blocks on a retrain in progress.
pub struct NeuralIntentClassifier {
    builder: FeatureBuilder,
    snapshot: RwLock<Option<Arc<Model>>>,
}

impl NeuralIntentClassifier {
    pub fn new(builder: FeatureBuilder) -> Self {
        NeuralIntentClassifier {
            builder,
            snapshot: RwLock::new(None),
        }
    }

    /// Create a classifier that already serves `model`.
    pub fn with_model(builder: FeatureBuilder, model: Model) -> Self {
        let classifier = Self::new(builder);
        classifier.install(model);
        classifier
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    /// The model currently served, if any.
    pub fn snapshot(&self) -> Option<Arc<Model>> {
        self.snapshot.read().clone()
    }

    pub fn is_trained(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Publish `model`, returning the one it replaced.
    pub fn install(&self, model: Model) -> Option<Arc<Model>> {
        let model = Arc::new(model);
        debug!(model_id = %model.metadata().model_id, "installing model snapshot");
        self.snapshot.write().replace(model)
    }

    /// Drop back to the untrained state.
    pub fn clear(&self) -> Option<Arc<Model>> {
        self.snapshot.write().take()
    }

    /// Train on `corpus` and install the result.
    pub fn train(&self, corpus: &Corpus, config: &TrainingConfig) -> Result<TrainingReport> {
        let (model, report) = train_model(&self.builder, corpus, config)?;
        self.install(model);
        Ok(report)
    }

    /// Load the model in `store`. On any failure the classifier is left
    /// untrained and the reason is returned.
    pub fn load(&self, store: &ModelStore) -> std::result::Result<(), ModelLoadError> {
        match store.load() {
            Ok(model) => {
                self.install(model);
                Ok(())
            }
            Err(e) => {
                warn!(model = store.name(), error = %e, "model not loaded, classifier is untrained");
                self.clear();
                Err(e)
            }
        }
    }

    /// Persist the served model. Does nothing when untrained.
    pub fn save(&self, store: &ModelStore) -> Result<bool> {
        match self.snapshot() {
            Some(model) => {
                store.save(&model)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Prediction for `text`, or `None` while untrained.
    pub fn predict(&self, text: &str) -> Result<Option<Prediction>> {
        let Some(model) = self.snapshot() else {
            return Ok(None);
        };
        model.predict(&self.builder, text).map(Some)
    }
}

impl Default for NeuralIntentClassifier {
    fn default() -> Self {
        Self::new(FeatureBuilder::default())
    }
}

impl IntentClassifier for NeuralIntentClassifier {
    fn classify(&self, text: &str) -> Option<Prediction> {
        match self.predict(text) {
            Ok(prediction) => prediction.filter(Prediction::is_valid),
            Err(e) => {
                warn!(error = %e, "classifier failed, ignoring");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "neural"
    }
}

impl std::fmt::Debug for NeuralIntentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralIntentClassifier")
            .field("builder", &self.builder)
            .field("trained", &self.is_trained())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::intent_classifier::corpus::IntentDefinition;
    use crate::storage::MemoryStorage;

    fn corpus() -> Corpus {
        Corpus::new(vec![
            IntentDefinition::new("greeting", &["hello", "hi there"]),
            IntentDefinition::new("weather", &["is it raining", "weather forecast"]),
        ])
    }

    fn config() -> TrainingConfig {
        TrainingConfig {
            epochs: 500,
            hidden_size: 8,
            seed: Some(11),
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_untrained_classifier_has_no_opinion() {
        let classifier = NeuralIntentClassifier::default();
        assert!(!classifier.is_trained());
        assert_eq!(classifier.classify("hello"), None);
        assert_eq!(classifier.predict("hello").unwrap(), None);
    }

    #[test]
    fn test_train_installs_model() {
        let classifier = NeuralIntentClassifier::default();
        let report = classifier.train(&corpus(), &config()).unwrap();

        assert!(classifier.is_trained());
        assert_eq!(report.epochs(), 500);

        let prediction = classifier.classify("hello").unwrap();
        assert!(prediction.is_valid());
        assert!(["greeting", "weather"].contains(&prediction.label.as_str()));
    }

    #[test]
    fn test_snapshot_survives_retrain() {
        let classifier = NeuralIntentClassifier::default();
        classifier.train(&corpus(), &config()).unwrap();
        let before = classifier.snapshot().unwrap();

        classifier.train(&corpus(), &config()).unwrap();
        let after = classifier.snapshot().unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        // The old snapshot is still a complete, usable model.
        assert_eq!(before.classes().len(), 2);
        assert!(before.predict(classifier.builder(), "hello").unwrap().is_valid());
    }

    #[test]
    fn test_failed_load_resets_to_untrained() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ModelStore::new(storage.clone(), "brain.icnm");

        let classifier = NeuralIntentClassifier::default();
        classifier.train(&corpus(), &config()).unwrap();
        assert!(classifier.save(&store).unwrap());

        let fresh = NeuralIntentClassifier::default();
        fresh.load(&store).unwrap();
        assert_eq!(fresh.snapshot().unwrap().as_ref(), classifier.snapshot().unwrap().as_ref());

        storage.put("brain.icnm", b"ICNM broken").unwrap();
        assert!(fresh.load(&store).is_err());
        assert!(!fresh.is_trained());
        assert_eq!(fresh.classify("hello"), None);
    }

    #[test]
    fn test_save_untrained_is_noop() {
        let store = ModelStore::new(Arc::new(MemoryStorage::new()), "brain.icnm");
        assert!(!NeuralIntentClassifier::default().save(&store).unwrap());
        assert!(!store.exists());
    }
}
