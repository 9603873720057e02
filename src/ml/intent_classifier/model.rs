//! Trained model: weights plus the vocabulary and classes they were fit to.
//!
//! # Persisted layout
//!
//! ```text
//! [magic: "ICNM"][version: u16 LE][payload length: u64 LE][crc32 of payload: u32 LE][payload]
//! ```
//!
//! The payload is a bincode-encoded record with named fields. Any blob that
//! fails a structural check is rejected with a [`ModelLoadError`]; a model
//! is never partially loaded.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::matrix::Matrix;
use super::network::NeuralNetwork;
use super::types::Prediction;
use super::vocabulary::{Classes, FeatureBuilder, Vocabulary, bits_to_dense};
use crate::error::{IntentError, ModelLoadError, Result};
use crate::storage::Storage;

/// Magic bytes at the start of every model blob.
pub const MODEL_MAGIC: &[u8; 4] = b"ICNM";

/// Current persisted format version.
pub const MODEL_FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 8 + 4;

/// Identity of one training run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
}

impl ModelMetadata {
    pub fn fresh() -> Self {
        ModelMetadata {
            model_id: Uuid::new_v4(),
            // Millisecond precision is what the blob stores.
            trained_at: DateTime::from_timestamp_millis(Utc::now().timestamp_millis())
                .unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedModel {
    hidden_size: u64,
    w1: Vec<f64>,
    w2: Vec<f64>,
    vocabulary: Vec<String>,
    classes: Vec<String>,
    model_id: [u8; 16],
    trained_at: i64,
}

/// Weights, vocabulary and classes as one immutable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    network: NeuralNetwork,
    vocabulary: Vocabulary,
    classes: Classes,
    metadata: ModelMetadata,
}

impl Model {
    /// Bundle a network with its vocabulary and classes, checking shapes.
    pub fn new(
        network: NeuralNetwork,
        vocabulary: Vocabulary,
        classes: Classes,
    ) -> std::result::Result<Self, ModelLoadError> {
        Self::with_metadata(network, vocabulary, classes, ModelMetadata::fresh())
    }

    pub fn with_metadata(
        network: NeuralNetwork,
        vocabulary: Vocabulary,
        classes: Classes,
        metadata: ModelMetadata,
    ) -> std::result::Result<Self, ModelLoadError> {
        if network.input_size() != vocabulary.len() {
            return Err(ModelLoadError::ShapeMismatch(format!(
                "w1 has {} rows but the vocabulary has {} stems",
                network.input_size(),
                vocabulary.len()
            )));
        }
        if network.output_size() != classes.len() {
            return Err(ModelLoadError::ShapeMismatch(format!(
                "w2 has {} columns but there are {} classes",
                network.output_size(),
                classes.len()
            )));
        }
        if classes.is_empty() {
            return Err(ModelLoadError::ShapeMismatch(
                "model has no classes".to_string(),
            ));
        }
        if network.hidden_size() == 0 {
            return Err(ModelLoadError::ShapeMismatch(
                "hidden layer is empty".to_string(),
            ));
        }

        Ok(Model {
            network,
            vocabulary,
            classes,
            metadata,
        })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn classes(&self) -> &Classes {
        &self.classes
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn hidden_size(&self) -> usize {
        self.network.hidden_size()
    }

    /// Highest output and its label. Ties go to the lowest index.
    pub fn predict_features(&self, input: &[f64]) -> Prediction {
        let output = self.network.forward(input);
        let mut best = 0;
        for (i, value) in output.iter().enumerate() {
            if *value > output[best] {
                best = i;
            }
        }
        let label = self.classes.get(best).unwrap_or_default();
        Prediction::new(label, output.get(best).copied().unwrap_or(0.0))
    }

    /// Analyse, encode and classify `text`.
    pub fn predict(&self, builder: &FeatureBuilder, text: &str) -> Result<Prediction> {
        let bits = builder.encode(text, &self.vocabulary)?;
        Ok(self.predict_features(&bits_to_dense(&bits)))
    }

    /// Encode the model into its persisted form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let persisted = PersistedModel {
            hidden_size: self.hidden_size() as u64,
            w1: self.network.w1().as_slice().to_vec(),
            w2: self.network.w2().as_slice().to_vec(),
            vocabulary: self.vocabulary.as_slice().to_vec(),
            classes: self.classes.as_slice().to_vec(),
            model_id: *self.metadata.model_id.as_bytes(),
            trained_at: self.metadata.trained_at.timestamp_millis(),
        };
        let payload = bincode::serialize(&persisted)
            .map_err(|e| IntentError::serialization(format!("Failed to encode model: {e}")))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(MODEL_MAGIC);
        bytes.write_u16::<LittleEndian>(MODEL_FORMAT_VERSION)?;
        bytes.write_u64::<LittleEndian>(payload.len() as u64)?;
        bytes.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode and validate a persisted model.
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, ModelLoadError> {
        let corrupt = |msg: &str| ModelLoadError::Corrupt(msg.to_string());

        if bytes.len() < HEADER_LEN {
            return Err(corrupt("blob is shorter than the header"));
        }

        let mut cursor = Cursor::new(bytes);
        let mut magic = [0u8; 4];
        cursor
            .read_exact(&mut magic)
            .map_err(|_| corrupt("truncated magic"))?;
        if &magic != MODEL_MAGIC {
            return Err(corrupt("bad magic bytes"));
        }

        let version = cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| corrupt("truncated version"))?;
        if version != MODEL_FORMAT_VERSION {
            return Err(ModelLoadError::UnsupportedVersion {
                found: version,
                expected: MODEL_FORMAT_VERSION,
            });
        }

        let payload_len = cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| corrupt("truncated payload length"))?;
        let checksum = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| corrupt("truncated checksum"))?;

        let payload = &bytes[HEADER_LEN..];
        if payload.len() as u64 != payload_len {
            return Err(ModelLoadError::Corrupt(format!(
                "payload is {} bytes, header says {payload_len}",
                payload.len()
            )));
        }
        if crc32fast::hash(payload) != checksum {
            return Err(corrupt("checksum mismatch"));
        }

        let persisted: PersistedModel = bincode::deserialize(payload)
            .map_err(|e| ModelLoadError::Corrupt(format!("undecodable payload: {e}")))?;

        Self::from_persisted(persisted)
    }

    fn from_persisted(p: PersistedModel) -> std::result::Result<Self, ModelLoadError> {
        let vocabulary = Vocabulary::from_sorted(p.vocabulary).map_err(|i| {
            ModelLoadError::Corrupt(format!("vocabulary is not sorted at position {i}"))
        })?;
        let classes = Classes::from_sorted(p.classes).map_err(|i| {
            ModelLoadError::Corrupt(format!("classes are not sorted at position {i}"))
        })?;
        if classes.is_empty() {
            return Err(ModelLoadError::ShapeMismatch(
                "model has no classes".to_string(),
            ));
        }

        let hidden = usize::try_from(p.hidden_size)
            .map_err(|_| ModelLoadError::Corrupt("hidden size out of range".to_string()))?;
        let shape_error = |name: &str, len: usize, rows: usize, cols: usize| {
            ModelLoadError::ShapeMismatch(format!(
                "{name} has {len} weights, expected {rows}x{cols}"
            ))
        };

        let w1_len = p.w1.len();
        let w1 = Matrix::from_vec(vocabulary.len(), hidden, p.w1)
            .map_err(|_| shape_error("w1", w1_len, vocabulary.len(), hidden))?;
        let w2_len = p.w2.len();
        let w2 = Matrix::from_vec(hidden, classes.len(), p.w2)
            .map_err(|_| shape_error("w2", w2_len, hidden, classes.len()))?;
        if !w1.is_finite() || !w2.is_finite() {
            return Err(ModelLoadError::Corrupt(
                "weights contain non-finite values".to_string(),
            ));
        }

        let network = NeuralNetwork::from_weights(w1, w2)
            .map_err(|e| ModelLoadError::ShapeMismatch(e.to_string()))?;
        let trained_at = DateTime::from_timestamp_millis(p.trained_at)
            .ok_or_else(|| ModelLoadError::Corrupt("timestamp out of range".to_string()))?;

        Self::with_metadata(
            network,
            vocabulary,
            classes,
            ModelMetadata {
                model_id: Uuid::from_bytes(p.model_id),
                trained_at,
            },
        )
    }
}

/// Publishes and loads one named model blob in a [`Storage`].
#[derive(Debug, Clone)]
pub struct ModelStore {
    storage: Arc<dyn Storage>,
    name: String,
}

impl ModelStore {
    pub fn new<S: Into<String>>(storage: Arc<dyn Storage>, name: S) -> Self {
        ModelStore {
            storage,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self) -> bool {
        self.storage.file_exists(&self.name)
    }

    /// Size in bytes of the published blob.
    pub fn size(&self) -> Result<u64> {
        self.storage.file_size(&self.name)
    }

    /// Write to a temporary file, then rename over the published name.
    pub fn save(&self, model: &Model) -> Result<()> {
        let bytes = model.to_bytes()?;

        let (temp_name, mut output) = self.storage.create_temp_output(&self.name)?;
        let written = output.write_all(&bytes).map_err(IntentError::from);
        let written = written.and_then(|_| output.flush_and_sync());
        drop(output);

        if let Err(e) = written {
            let _ = self.storage.delete_file(&temp_name);
            return Err(e);
        }

        self.storage.rename_file(&temp_name, &self.name)?;
        info!(
            model = %self.name,
            model_id = %model.metadata().model_id,
            bytes = bytes.len(),
            "model published"
        );
        Ok(())
    }

    pub fn load(&self) -> std::result::Result<Model, ModelLoadError> {
        if !self.exists() {
            return Err(ModelLoadError::NotFound(self.name.clone()));
        }

        let mut input = self
            .storage
            .open_input(&self.name)
            .map_err(|e| ModelLoadError::NotFound(format!("{}: {e}", self.name)))?;
        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .map_err(|e| ModelLoadError::Corrupt(format!("read failed: {e}")))?;

        let model = Model::from_bytes(&bytes)?;
        debug!(model = %self.name, model_id = %model.metadata().model_id, "model loaded");
        Ok(model)
    }
}
