//! Machine learning components of the recognition cascade.

pub mod intent_classifier;
