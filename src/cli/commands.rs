//! Command implementations for the intent-cascade CLI.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineConfig;
use crate::engine::IntentEngine;
use crate::error::{IntentError, Result};
use crate::intent::pattern::PatternMatcher;
use crate::ml::intent_classifier::{Corpus, ModelStore, load_training_data};
use crate::storage::{FileStorage, StorageConfig};

/// Execute a CLI command.
pub fn execute_command(args: CascadeArgs) -> Result<()> {
    let config = load_config(&args)?;
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), config, &args),
        Command::Classify(classify_args) => classify(classify_args.clone(), config, &args),
        Command::Inspect(inspect_args) => inspect(inspect_args.clone(), config, &args),
        Command::Patterns => list_patterns(&args),
    }
}

/// Engine configuration from `--config`, or the defaults.
pub fn load_config(args: &CascadeArgs) -> Result<EngineConfig> {
    match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "loading engine configuration");
            EngineConfig::from_file(path)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Train on a corpus and persist the model.
fn train(args: TrainArgs, mut config: EngineConfig, cli_args: &CascadeArgs) -> Result<()> {
    if let Some(epochs) = args.epochs {
        config.training.epochs = epochs;
    }
    if let Some(hidden) = args.hidden {
        config.training.hidden_size = hidden;
    }
    if let Some(learning_rate) = args.learning_rate {
        config.training.learning_rate = learning_rate;
    }
    if args.seed.is_some() {
        config.training.seed = args.seed;
    }
    config.model_dir = Some(args.model_dir);

    let corpus = match &args.corpus {
        Some(path) => load_training_data(path)?,
        None => Corpus::builtin()?,
    };
    if cli_args.verbosity() > 1 {
        println!(
            "Training on {} phrases across {} intents",
            corpus.phrase_count(),
            corpus.intents.len()
        );
    }

    let engine = IntentEngine::new(config)?;
    let report = engine.train(&corpus)?;
    let model = engine
        .model()
        .ok_or_else(|| IntentError::training("training finished without a model"))?;
    let model_path = engine
        .config()
        .model_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    output_result(
        "Model trained successfully",
        &TrainingSummary::new(model_path, &model, &report),
        cli_args,
    )
}

/// Recognise one utterance.
fn classify(args: ClassifyArgs, mut config: EngineConfig, cli_args: &CascadeArgs) -> Result<()> {
    if let Some(threshold) = args.threshold {
        config.arbiter.confidence_threshold = threshold;
    }
    if let Some(dir) = &args.model_dir {
        config.model_dir = Some(dir.clone());
    }

    let engine = IntentEngine::new(config)?;
    if engine.config().model_dir.is_some() && !engine.is_trained() {
        warn!("no usable model, only the pattern table and fallback are active");
    }

    let intent = engine.recognize(&args.utterance());
    output_result(
        "Intent recognised",
        &ClassificationResult { intent },
        cli_args,
    )
}

/// Show a persisted model.
fn inspect(args: InspectArgs, config: EngineConfig, cli_args: &CascadeArgs) -> Result<()> {
    let storage = FileStorage::new(&args.model_dir, StorageConfig::default())?;
    let store = ModelStore::new(Arc::new(storage), config.model_file.clone());

    let model = store.load()?;
    let size = store.size()?;
    let path = args.model_dir.join(&config.model_file).display().to_string();

    output_result(
        "Model loaded",
        &ModelInfo::new(path, size, &model, args.detailed),
        cli_args,
    )
}

/// Print the built-in pattern table.
fn list_patterns(cli_args: &CascadeArgs) -> Result<()> {
    output_result(
        "Pattern table",
        &PatternTable::from_matcher(&PatternMatcher::new()),
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> CascadeArgs {
        CascadeArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_train_then_inspect() {
        let dir = TempDir::new().unwrap();
        let model_dir = dir.path().to_str().unwrap();

        let args = parse(&[
            "intent-cascade",
            "-q",
            "train",
            "--model-dir",
            model_dir,
            "--epochs",
            "50",
            "--hidden",
            "8",
            "--seed",
            "1",
        ]);
        execute_command(args).unwrap();
        assert!(dir.path().join(crate::config::DEFAULT_MODEL_FILE).exists());

        let args = parse(&["intent-cascade", "-q", "inspect", "--model-dir", model_dir]);
        execute_command(args).unwrap();
    }

    #[test]
    fn test_inspect_missing_model() {
        let dir = TempDir::new().unwrap();
        let args = parse(&[
            "intent-cascade",
            "inspect",
            "--model-dir",
            dir.path().to_str().unwrap(),
        ]);
        let result = execute_command(args);
        assert!(matches!(result, Err(IntentError::Model(_))));
    }

    #[test]
    fn test_classify_without_model() {
        let args = parse(&["intent-cascade", "-q", "classify", "open", "chrome"]);
        assert!(execute_command(args).is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let args = parse(&[
            "intent-cascade",
            "classify",
            "--threshold",
            "1.5",
            "hello",
        ]);
        assert!(matches!(
            execute_command(args),
            Err(IntentError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let args = parse(&[
            "intent-cascade",
            "--config",
            "/nonexistent/engine.json",
            "patterns",
        ]);
        assert!(execute_command(args).is_err());
    }
}
