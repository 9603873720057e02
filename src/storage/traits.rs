//! Storage abstraction trait and common types.

use std::io::{Read, Write};

use thiserror::Error;

use crate::error::{IntentError, Result};

/// A named-blob store that models are published into.
///
/// Writers go through [`Storage::create_temp_output`] and then
/// [`Storage::rename_file`], so readers of a name see either the old blob or
/// the complete new one.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open a file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create (or truncate) a file for writing.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Create a uniquely named temporary file next to `prefix`.
    fn create_temp_output(&self, prefix: &str) -> Result<(String, Box<dyn StorageOutput>)>;

    /// Atomically replace `new_name` with `old_name`.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// List all files in the storage, sorted.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Get the size of a file in bytes.
    fn file_size(&self, name: &str) -> Result<u64>;

    /// Sync all pending writes to storage.
    fn sync(&self) -> Result<()>;

    /// Close the storage. Later operations fail with [`StorageError::StorageClosed`].
    fn close(&mut self) -> Result<()>;
}

/// A trait for reading data from storage.
pub trait StorageInput: Read + Send + std::fmt::Debug {
    /// Get the size of the input stream.
    fn size(&self) -> Result<u64>;
}

/// A trait for writing data to storage.
pub trait StorageOutput: Write + Send + std::fmt::Debug {
    /// Flush and sync the output to storage.
    fn flush_and_sync(&mut self) -> Result<()>;

    /// Number of bytes written so far.
    fn position(&self) -> u64;
}

/// Configuration for storage backends.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Buffer size for I/O operations.
    pub buffer_size: usize,

    /// Whether to flush after every write.
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            buffer_size: 64 * 1024,
            sync_writes: false,
        }
    }
}

/// Error types specific to storage operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Storage is closed.
    #[error("Storage is closed")]
    StorageClosed,
}

impl From<StorageError> for IntentError {
    fn from(err: StorageError) -> Self {
        IntentError::storage(err.to_string())
    }
}

/// Pick the first `{prefix}_{n}.tmp` name for which `exists` is false.
pub(crate) fn next_temp_name(prefix: &str, exists: impl Fn(&str) -> bool) -> Result<String> {
    for counter in 0..=10_000 {
        let name = format!("{prefix}_{counter}.tmp");
        if !exists(&name) {
            return Ok(name);
        }
    }
    Err(StorageError::IoError("Could not create temporary file".to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();

        assert_eq!(config.buffer_size, 65536);
        assert!(!config.sync_writes);
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::FileNotFound("brain.icnm".to_string());
        assert_eq!(err.to_string(), "File not found: brain.icnm");

        let err = StorageError::IoError("disk full".to_string());
        assert_eq!(err.to_string(), "I/O error: disk full");

        let err: IntentError = StorageError::StorageClosed.into();
        assert_eq!(err.to_string(), "Storage error: Storage is closed");
    }

    #[test]
    fn test_next_temp_name_skips_taken_names() {
        let taken = ["model_0.tmp", "model_1.tmp"];
        let name = next_temp_name("model", |n| taken.contains(&n)).unwrap();
        assert_eq!(name, "model_2.tmp");

        assert!(next_temp_name("model", |_| true).is_err());
    }
}
