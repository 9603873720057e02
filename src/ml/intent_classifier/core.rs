//! Helper functions for building and training intent classifiers.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::error::{IntentError, Result};
use crate::ml::intent_classifier::classifier::NeuralIntentClassifier;
use crate::ml::intent_classifier::corpus::Corpus;
use crate::ml::intent_classifier::model::Model;
use crate::ml::intent_classifier::network::{NeuralNetwork, TrainingConfig, TrainingReport};
use crate::ml::intent_classifier::vocabulary::FeatureBuilder;

/// Load a training corpus from a JSON file.
pub fn load_training_data<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    Corpus::from_file(path)
}

/// Create an untrained neural classifier around `analyzer`.
pub fn new_neural(analyzer: Arc<dyn Analyzer>) -> NeuralIntentClassifier {
    NeuralIntentClassifier::new(FeatureBuilder::new(analyzer))
}

/// Build features from `corpus` and fit a fresh network to them.
///
/// Nothing is shared with any served model; the caller decides when to swap.
pub fn train_model(
    builder: &FeatureBuilder,
    corpus: &Corpus,
    config: &TrainingConfig,
) -> Result<(Model, TrainingReport)> {
    config.validate()?;
    let set = builder.build(corpus)?;

    info!(
        vocabulary = set.vocabulary.len(),
        classes = set.classes.len(),
        examples = set.examples.len(),
        hidden = config.hidden_size,
        epochs = config.epochs,
        "training intent network"
    );

    let inputs = set.inputs();
    let targets = set.targets();
    let mut rng = config.rng();
    let mut network = NeuralNetwork::new(
        set.vocabulary.len(),
        config.hidden_size,
        set.classes.len(),
        config.init_range,
        &mut rng,
    );
    let report = network.train(&inputs, &targets, config)?;

    info!(
        initial_error = report.initial_error().unwrap_or_default(),
        final_error = report.final_error().unwrap_or_default(),
        elapsed_ms = report.duration.as_millis() as u64,
        "training finished"
    );

    let model = Model::new(network, set.vocabulary, set.classes)
        .map_err(|e| IntentError::training(e.to_string()))?;
    Ok((model, report))
}
