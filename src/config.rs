//! Engine configuration.
//!
//! Every section has a `Default`, so a config file only needs the values it
//! changes:
//!
//! ```json
//! {
//!   "arbiter": { "confidence_threshold": 0.8 },
//!   "training": { "epochs": 1500, "seed": 7 },
//!   "model_dir": "/var/lib/assistant"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IntentError, Result};
use crate::intent::arbiter::ArbiterConfig;
use crate::ml::intent_classifier::TrainingConfig;

/// File name used for the persisted model when none is configured.
pub const DEFAULT_MODEL_FILE: &str = "intent_model.icnm";

/// Configuration for [`crate::engine::IntentEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub arbiter: ArbiterConfig,
    pub training: TrainingConfig,
    /// Directory holding the persisted model. No persistence when absent.
    pub model_dir: Option<PathBuf>,
    /// Name of the model inside `model_dir`.
    pub model_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            arbiter: ArbiterConfig::default(),
            training: TrainingConfig::default(),
            model_dir: None,
            model_file: DEFAULT_MODEL_FILE.to_string(),
        }
    }
}

impl EngineConfig {
    /// Read and validate a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            IntentError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: EngineConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.arbiter.validate()?;
        self.training.validate()?;
        if self.model_file.trim().is_empty() {
            return Err(IntentError::invalid_config("model_file must not be empty"));
        }
        if self.model_file.contains(['/', '\\']) {
            return Err(IntentError::invalid_config(format!(
                "model_file must be a bare file name, got {:?}",
                self.model_file
            )));
        }
        Ok(())
    }

    pub fn with_model_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.model_dir = Some(dir.into());
        self
    }

    /// Full path of the persisted model, if persistence is enabled.
    pub fn model_path(&self) -> Option<PathBuf> {
        self.model_dir.as_ref().map(|dir| dir.join(&self.model_file))
    }
}
