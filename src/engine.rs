//! The intent engine: one classifier, its model store and the arbiter.
//!
//! On construction the engine loads the persisted model if one exists and
//! otherwise starts untrained, in which case every utterance that misses the
//! pattern table falls back to `query`. Retraining builds a new model off to
//! the side, persists it and then swaps it in, so concurrent
//! [`IntentEngine::recognize`] calls see either the old or the new model.
//!
//! # Examples
//!
//! ```
//! use intent_cascade::config::EngineConfig;
//! use intent_cascade::engine::IntentEngine;
//!
//! let engine = IntentEngine::new(EngineConfig::default()).unwrap();
//! let intent = engine.recognize("open chrome");
//!
//! assert_eq!(intent.action().as_str(), "open_app");
//! assert_eq!(intent.confidence(), 1.0);
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{IntentError, ModelLoadError, Result};
use crate::intent::arbiter::{Intent, IntentArbiter};
use crate::ml::intent_classifier::{
    Corpus, FeatureBuilder, Model, ModelStore, NeuralIntentClassifier, TrainingConfig,
    TrainingReport, train_model,
};
use crate::storage::{FileStorage, Storage, StorageConfig};

/// Name of the background retrain thread.
const RETRAIN_THREAD: &str = "intent-retrain";

/// Pattern table, neural classifier and fallback behind one call.
pub struct IntentEngine {
    config: EngineConfig,
    classifier: Arc<NeuralIntentClassifier>,
    store: Option<ModelStore>,
    arbiter: IntentArbiter,
    /// Held while a retrain persists and swaps.
    publish: Arc<Mutex<()>>,
}

impl IntentEngine {
    /// Create an engine, persisting under `config.model_dir` when set.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let store = match &config.model_dir {
            Some(dir) => {
                let storage = FileStorage::new(dir, StorageConfig::default())?;
                Some(ModelStore::new(Arc::new(storage), config.model_file.clone()))
            }
            None => None,
        };
        Ok(Self::assemble(config, store, FeatureBuilder::default()))
    }

    /// Create an engine that persists into `storage`, ignoring `model_dir`.
    pub fn with_storage(config: EngineConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        config.validate()?;
        let store = ModelStore::new(storage, config.model_file.clone());
        Ok(Self::assemble(config, Some(store), FeatureBuilder::default()))
    }

    /// Create an engine with a custom feature builder and no persistence.
    pub fn with_builder(config: EngineConfig, builder: FeatureBuilder) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, None, builder))
    }

    fn assemble(config: EngineConfig, store: Option<ModelStore>, builder: FeatureBuilder) -> Self {
        let classifier = Arc::new(NeuralIntentClassifier::new(builder));
        let arbiter = IntentArbiter::new(config.arbiter.clone()).with_classifier(classifier.clone());

        let engine = IntentEngine {
            config,
            classifier,
            store,
            arbiter,
            publish: Arc::new(Mutex::new(())),
        };

        match &engine.store {
            Some(store) if store.exists() => {
                // Failures are logged by the classifier, which stays untrained.
                if engine.classifier.load(store).is_ok() {
                    info!(model = store.name(), "persisted model loaded");
                }
            }
            Some(store) => info!(model = store.name(), "no persisted model, starting untrained"),
            None => debug!("no model store configured, starting untrained"),
        }
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Arc<NeuralIntentClassifier> {
        &self.classifier
    }

    pub fn arbiter(&self) -> &IntentArbiter {
        &self.arbiter
    }

    pub fn store(&self) -> Option<&ModelStore> {
        self.store.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.classifier.is_trained()
    }

    /// The model currently served.
    pub fn model(&self) -> Option<Arc<Model>> {
        self.classifier.snapshot()
    }

    /// Recognise the intent of `text`.
    pub fn recognize(&self, text: &str) -> Intent {
        self.arbiter.recognize(text)
    }

    /// Reload the persisted model. The engine is untrained after a failure.
    pub fn reload(&self) -> std::result::Result<(), ModelLoadError> {
        match &self.store {
            Some(store) => self.classifier.load(store),
            None => Err(ModelLoadError::NotFound(
                "no model store configured".to_string(),
            )),
        }
    }

    /// Train on `corpus`, persist, then swap the new model in.
    pub fn train(&self, corpus: &Corpus) -> Result<TrainingReport> {
        self.job().run(corpus)
    }

    /// Train on the bundled corpus.
    pub fn train_builtin(&self) -> Result<TrainingReport> {
        self.train(&Corpus::builtin()?)
    }

    /// Run [`IntentEngine::train`] on a dedicated thread.
    pub fn retrain_in_background(
        &self,
        corpus: Corpus,
    ) -> Result<JoinHandle<Result<TrainingReport>>> {
        let job = self.job();
        let handle = thread::Builder::new()
            .name(RETRAIN_THREAD.to_string())
            .spawn(move || job.run(&corpus))?;
        Ok(handle)
    }

    /// Run [`IntentEngine::train`] on tokio's blocking pool.
    pub async fn retrain_async(&self, corpus: Corpus) -> Result<TrainingReport> {
        let job = self.job();
        tokio::task::spawn_blocking(move || job.run(&corpus))
            .await
            .map_err(|e| IntentError::training(format!("retrain task failed: {e}")))?
    }

    fn job(&self) -> RetrainJob {
        RetrainJob {
            classifier: self.classifier.clone(),
            store: self.store.clone(),
            config: self.config.training.clone(),
            publish: self.publish.clone(),
        }
    }
}

impl std::fmt::Debug for IntentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentEngine")
            .field("config", &self.config)
            .field("store", &self.store.as_ref().map(ModelStore::name))
            .field("trained", &self.is_trained())
            .finish()
    }
}

/// Everything a retrain needs, detached from the engine's lifetime.
struct RetrainJob {
    classifier: Arc<NeuralIntentClassifier>,
    store: Option<ModelStore>,
    config: TrainingConfig,
    publish: Arc<Mutex<()>>,
}

impl RetrainJob {
    fn run(self, corpus: &Corpus) -> Result<TrainingReport> {
        let (model, report) = train_model(self.classifier.builder(), corpus, &self.config)?;

        let _guard = self.publish.lock();
        if let Some(store) = &self.store {
            store.save(&model)?;
        }
        let model_id = model.metadata().model_id;
        self.classifier.install(model);
        info!(%model_id, epochs = report.epochs(), "retrained model is live");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::action::Action;
    use crate::intent::arbiter::IntentSource;
    use crate::ml::intent_classifier::IntentDefinition;
    use crate::storage::MemoryStorage;

    fn quick_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.training.epochs = 400;
        config.training.hidden_size = 8;
        config.training.learning_rate = 0.5;
        config.training.seed = Some(7);
        config
    }

    fn corpus() -> Corpus {
        Corpus::new(vec![
            IntentDefinition::new("greeting", &["hello", "hello there", "hey hello"]),
            IntentDefinition::new("goodbye", &["goodbye", "bye bye", "see you later"]),
        ])
    }

    #[test]
    fn test_untrained_engine() {
        let engine = IntentEngine::new(EngineConfig::default()).unwrap();
        assert!(!engine.is_trained());
        assert!(engine.reload().is_err());

        let intent = engine.recognize("tell me a joke");
        assert_eq!(intent.action(), &Action::Query);
        assert_eq!(intent.source(), IntentSource::Fallback);
    }

    #[test]
    fn test_train_persists_then_serves() {
        let storage = Arc::new(MemoryStorage::new());
        let engine = IntentEngine::with_storage(quick_config(), storage.clone()).unwrap();

        let report = engine.train(&corpus()).unwrap();
        assert_eq!(report.epochs(), 400);
        assert!(engine.is_trained());
        assert!(engine.store().unwrap().exists());

        let live = engine.model().unwrap();
        let restarted = IntentEngine::with_storage(quick_config(), storage).unwrap();
        assert_eq!(restarted.model().unwrap().as_ref(), live.as_ref());
    }

    #[test]
    fn test_background_retrain_swaps_model() {
        let engine = IntentEngine::with_storage(quick_config(), Arc::new(MemoryStorage::new()))
            .unwrap();
        engine.train(&corpus()).unwrap();
        let before = engine.model().unwrap();

        let handle = engine.retrain_in_background(corpus()).unwrap();
        assert_eq!(handle.thread().name(), Some(RETRAIN_THREAD));
        handle.join().unwrap().unwrap();

        let after = engine.model().unwrap();
        assert_ne!(before.metadata().model_id, after.metadata().model_id);
        // Readers that held the old snapshot still have a complete model.
        assert_eq!(before.classes().len(), 2);
    }

    #[test]
    fn test_failed_training_keeps_model() {
        let engine = IntentEngine::with_builder(quick_config(), FeatureBuilder::default()).unwrap();
        engine.train(&corpus()).unwrap();
        let before = engine.model().unwrap();

        assert!(engine.train(&Corpus::new(Vec::new())).is_err());
        assert_eq!(engine.model().unwrap().metadata(), before.metadata());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.training.hidden_size = 0;
        assert!(IntentEngine::new(config).is_err());
    }
}
