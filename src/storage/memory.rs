//! In-memory storage implementation for tests and ephemeral engines.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::storage::traits::{
    Storage, StorageError, StorageInput, StorageOutput, next_temp_name,
};

type FileMap = Arc<Mutex<HashMap<String, Arc<[u8]>>>>;

/// Keeps every stored file in a shared map.
///
/// An output becomes visible under its name once it is flushed or dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: FileMap,
    closed: bool,
}

impl MemoryStorage {
    /// Create an empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn check_closed(&self) -> Result<()> {
        if self.closed {
            Err(StorageError::StorageClosed.into())
        } else {
            Ok(())
        }
    }

    /// Get the number of files stored.
    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }

    /// Overwrite a file with raw bytes.
    pub fn put(&self, name: &str, data: &[u8]) -> Result<()> {
        self.check_closed()?;
        self.files.lock().insert(name.to_string(), Arc::from(data));
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        self.check_closed()?;

        let data = self
            .files
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;

        Ok(Box::new(MemoryInput::new(data)))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        self.check_closed()?;

        Ok(Box::new(MemoryOutput::new(
            name.to_string(),
            Arc::clone(&self.files),
        )))
    }

    fn create_temp_output(&self, prefix: &str) -> Result<(String, Box<dyn StorageOutput>)> {
        self.check_closed()?;

        // Reserve the name under the same lock so a second writer picks another one.
        let temp_name = {
            let mut files = self.files.lock();
            let temp_name = next_temp_name(prefix, |name| files.contains_key(name))?;
            files.insert(temp_name.clone(), Arc::from(&[][..]));
            temp_name
        };
        let output = self.create_output(&temp_name)?;
        Ok((temp_name, output))
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.check_closed()?;

        let mut files = self.files.lock();
        let data = files
            .remove(old_name)
            .ok_or_else(|| StorageError::FileNotFound(old_name.to_string()))?;

        files.insert(new_name.to_string(), data);
        Ok(())
    }

    fn file_exists(&self, name: &str) -> bool {
        !self.closed && self.files.lock().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.check_closed()?;

        self.files.lock().remove(name);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        self.check_closed()?;

        let mut file_names: Vec<String> = self.files.lock().keys().cloned().collect();
        file_names.sort();
        Ok(file_names)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        self.check_closed()?;

        let files = self.files.lock();
        let data = files
            .get(name)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;

        Ok(data.len() as u64)
    }

    fn sync(&self) -> Result<()> {
        self.check_closed()
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// A reader over a snapshot of one stored file.
#[derive(Debug)]
pub struct MemoryInput {
    cursor: Cursor<Arc<[u8]>>,
}

impl MemoryInput {
    fn new(data: Arc<[u8]>) -> Self {
        MemoryInput {
            cursor: Cursor::new(data),
        }
    }
}

impl Read for MemoryInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl StorageInput for MemoryInput {
    fn size(&self) -> Result<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }
}

/// Buffers writes and publishes them under `name` on flush and on drop.
#[derive(Debug)]
pub struct MemoryOutput {
    name: String,
    buffer: Vec<u8>,
    files: FileMap,
}

impl MemoryOutput {
    fn new(name: String, files: FileMap) -> Self {
        MemoryOutput {
            name,
            buffer: Vec::new(),
            files,
        }
    }

    fn publish(&self) {
        self.files
            .lock()
            .insert(self.name.clone(), Arc::from(self.buffer.as_slice()));
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.publish();
        Ok(())
    }
}

impl StorageOutput for MemoryOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.publish();
        Ok(())
    }

    fn position(&self) -> u64 {
        self.buffer.len() as u64
    }
}

impl Drop for MemoryOutput {
    fn drop(&mut self) {
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_creation() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.file_count(), 0);
    }

    #[test]
    fn test_create_and_read_file() {
        let storage = MemoryStorage::new();

        let mut output = storage.create_output("brain.icnm").unwrap();
        output.write_all(b"Hello, Memory!").unwrap();
        output.flush_and_sync().unwrap();

        let mut input = storage.open_input("brain.icnm").unwrap();
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer).unwrap();

        assert_eq!(buffer, b"Hello, Memory!");
        assert_eq!(input.size().unwrap(), 14);
        assert_eq!(storage.file_count(), 1);
    }

    #[test]
    fn test_output_publishes_on_drop() {
        let storage = MemoryStorage::new();

        {
            let mut output = storage.create_output("brain.icnm").unwrap();
            output.write_all(b"abc").unwrap();
        }

        assert_eq!(storage.file_size("brain.icnm").unwrap(), 3);
    }

    #[test]
    fn test_file_operations() {
        let storage = MemoryStorage::new();

        assert!(!storage.file_exists("nonexistent.icnm"));

        storage.put("test.icnm", b"Test content").unwrap();
        assert!(storage.file_exists("test.icnm"));
        assert_eq!(storage.file_size("test.icnm").unwrap(), 12);
        assert_eq!(storage.list_files().unwrap(), vec!["test.icnm"]);

        storage.rename_file("test.icnm", "renamed.icnm").unwrap();
        assert!(!storage.file_exists("test.icnm"));
        assert!(storage.file_exists("renamed.icnm"));

        storage.delete_file("renamed.icnm").unwrap();
        assert!(!storage.file_exists("renamed.icnm"));
        assert_eq!(storage.file_count(), 0);
    }

    #[test]
    fn test_temp_file_names_are_unique() {
        let storage = MemoryStorage::new();

        let (first, _out1) = storage.create_temp_output("brain").unwrap();
        let (second, _out2) = storage.create_temp_output("brain").unwrap();

        assert_eq!(first, "brain_0.tmp");
        assert_eq!(second, "brain_1.tmp");
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let storage = MemoryStorage::new();
        storage.put("brain.icnm", b"old").unwrap();

        let mut input = storage.open_input("brain.icnm").unwrap();
        storage.put("brain.icnm", b"new!").unwrap();

        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer).unwrap();
        assert_eq!(buffer, b"old");
    }

    #[test]
    fn test_file_not_found() {
        let storage = MemoryStorage::new();

        assert!(storage.open_input("missing").is_err());
        assert!(storage.rename_file("missing", "other").is_err());
    }

    #[test]
    fn test_storage_close() {
        let mut storage = MemoryStorage::new();
        storage.close().unwrap();

        assert!(storage.create_output("x").is_err());
        assert!(storage.put("x", b"1").is_err());
        assert!(!storage.file_exists("x"));
    }
}
