//! Bag-of-words neural intent classifier.
//!
//! # Architecture
//!
//! - `Corpus`: tagged example phrases, loaded from JSON or bundled
//! - `FeatureBuilder`: analysis pipeline plus sorted `Vocabulary`/`Classes`
//! - `NeuralNetwork`: one sigmoid hidden layer, full-batch backprop
//! - `Model`: weights + vocabulary + classes, persisted as one blob
//! - `ModelStore`: atomic publish/load through a `Storage`
//! - `IntentClassifier` trait, implemented by `NeuralIntentClassifier`
//!
//! # Example
//!
//! ```
//! use intent_cascade::ml::intent_classifier::{
//!     Corpus, IntentClassifier, IntentDefinition, NeuralIntentClassifier, TrainingConfig,
//! };
//!
//! let corpus = Corpus::new(vec![
//!     IntentDefinition::new("greeting", &["hello", "hi there"]),
//!     IntentDefinition::new("weather", &["is it raining", "weather today"]),
//! ]);
//! let config = TrainingConfig { epochs: 200, seed: Some(1), ..TrainingConfig::default() };
//!
//! let classifier = NeuralIntentClassifier::default();
//! classifier.train(&corpus, &config).unwrap();
//!
//! let prediction = classifier.classify("hello").unwrap();
//! assert!(prediction.confidence >= 0.0 && prediction.confidence <= 1.0);
//! ```

mod classifier;
mod core;
mod corpus;
mod matrix;
mod model;
mod network;
mod types;
mod vocabulary;

// Public exports
pub use classifier::{IntentClassifier, NeuralIntentClassifier};
pub use self::core::{load_training_data, new_neural, train_model};
pub use corpus::{Corpus, IntentDefinition};
pub use matrix::Matrix;
pub use model::{MODEL_FORMAT_VERSION, MODEL_MAGIC, Model, ModelMetadata, ModelStore};
pub use network::{NeuralNetwork, TrainingConfig, TrainingReport, sigmoid};
pub use types::{Prediction, TrainingExample};
pub use vocabulary::{Classes, FeatureBuilder, TrainingSet, Vocabulary, bits_to_dense};
