//! File-based storage implementation.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{IntentError, Result};
use crate::storage::traits::{
    Storage, StorageConfig, StorageError, StorageInput, StorageOutput, next_temp_name,
};

/// A directory on disk holding one file per stored name.
#[derive(Debug)]
pub struct FileStorage {
    /// The root directory for storage.
    directory: PathBuf,
    /// Storage configuration.
    config: StorageConfig,
    /// Whether the storage is closed.
    closed: bool,
}

impl FileStorage {
    /// Open (creating if needed) a file storage in the given directory.
    pub fn new<P: AsRef<Path>>(directory: P, config: StorageConfig) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            std::fs::create_dir_all(&directory)
                .map_err(|e| IntentError::storage(format!("Failed to create directory: {e}")))?;
        }

        if !directory.is_dir() {
            return Err(IntentError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage {
            directory,
            config,
            closed: false,
        })
    }

    /// The directory this storage writes into.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    fn check_closed(&self) -> Result<()> {
        if self.closed {
            Err(StorageError::StorageClosed.into())
        } else {
            Ok(())
        }
    }
}

const TEMP_CREATE_ATTEMPTS: usize = 16;

fn not_found_or_io(name: &str, e: std::io::Error) -> StorageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StorageError::FileNotFound(name.to_string())
    } else {
        StorageError::IoError(e.to_string())
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        self.check_closed()?;

        let file = File::open(self.file_path(name)).map_err(|e| not_found_or_io(name, e))?;

        Ok(Box::new(FileInput::new(file, self.config.buffer_size)?))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        self.check_closed()?;

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.file_path(name))
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(Box::new(FileOutput::new(
            file,
            self.config.buffer_size,
            self.config.sync_writes,
        )))
    }

    fn create_temp_output(&self, prefix: &str) -> Result<(String, Box<dyn StorageOutput>)> {
        self.check_closed()?;

        // Another writer may claim the name between the scan and the open.
        for _ in 0..TEMP_CREATE_ATTEMPTS {
            let temp_name = next_temp_name(prefix, |name| self.file_exists(name))?;
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.file_path(&temp_name))
            {
                Ok(file) => {
                    let output = FileOutput::new(
                        file,
                        self.config.buffer_size,
                        self.config.sync_writes,
                    );
                    return Ok((temp_name, Box::new(output)));
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StorageError::IoError(e.to_string()).into()),
            }
        }
        Err(StorageError::IoError("Could not create temporary file".to_string()).into())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.check_closed()?;

        std::fs::rename(self.file_path(old_name), self.file_path(new_name))
            .map_err(|e| StorageError::IoError(format!("Failed to rename file: {e}")))?;

        Ok(())
    }

    fn file_exists(&self, name: &str) -> bool {
        !self.closed && self.file_path(name).is_file()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.check_closed()?;

        let path = self.file_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| StorageError::IoError(format!("Failed to delete file: {e}")))?;
        }

        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        self.check_closed()?;

        let mut files = Vec::new();
        for entry in
            std::fs::read_dir(&self.directory).map_err(|e| StorageError::IoError(e.to_string()))?
        {
            let path = entry.map_err(|e| StorageError::IoError(e.to_string()))?.path();
            if path.is_file() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        self.check_closed()?;

        let metadata = self
            .file_path(name)
            .metadata()
            .map_err(|e| not_found_or_io(name, e))?;

        Ok(metadata.len())
    }

    fn sync(&self) -> Result<()> {
        self.check_closed()?;
        // Outputs sync themselves in flush_and_sync.
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// A buffered reader over a stored file.
#[derive(Debug)]
pub struct FileInput {
    reader: BufReader<File>,
    size: u64,
}

impl FileInput {
    fn new(file: File, buffer_size: usize) -> Result<Self> {
        let size = file
            .metadata()
            .map_err(|e| IntentError::storage(format!("Failed to get file metadata: {e}")))?
            .len();

        Ok(FileInput {
            reader: BufReader::with_capacity(buffer_size, file),
            size,
        })
    }
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl StorageInput for FileInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }
}

/// A buffered writer into a stored file.
#[derive(Debug)]
pub struct FileOutput {
    writer: BufWriter<File>,
    sync_writes: bool,
    position: u64,
}

impl FileOutput {
    fn new(file: File, buffer_size: usize, sync_writes: bool) -> Self {
        FileOutput {
            writer: BufWriter::with_capacity(buffer_size, file),
            sync_writes,
            position: 0,
        }
    }
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes_written = self.writer.write(buf)?;
        self.position += bytes_written as u64;

        if self.sync_writes {
            self.writer.flush()?;
        }

        Ok(bytes_written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl StorageOutput for FileOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| IntentError::storage(format!("Failed to flush: {e}")))?;

        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| IntentError::storage(format!("Failed to sync: {e}")))?;

        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path(), StorageConfig::default()).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_file_storage_creation() {
        let (temp_dir, storage) = storage();
        assert_eq!(storage.directory(), temp_dir.path());
        assert!(storage.list_files().unwrap().is_empty());
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("models").join("v1");
        let storage = FileStorage::new(&nested, StorageConfig::default()).unwrap();
        assert!(nested.is_dir());
        assert!(storage.list_files().unwrap().is_empty());
    }

    #[test]
    fn test_create_and_read_file() {
        let (_temp_dir, storage) = storage();

        let mut output = storage.create_output("brain.icnm").unwrap();
        output.write_all(b"weights").unwrap();
        assert_eq!(output.position(), 7);
        output.flush_and_sync().unwrap();

        let mut input = storage.open_input("brain.icnm").unwrap();
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer).unwrap();

        assert_eq!(buffer, b"weights");
        assert_eq!(input.size().unwrap(), 7);
        assert_eq!(storage.file_size("brain.icnm").unwrap(), 7);
    }

    #[test]
    fn test_temp_then_rename_replaces_target() {
        let (_temp_dir, storage) = storage();

        let mut output = storage.create_output("brain.icnm").unwrap();
        output.write_all(b"old").unwrap();
        output.flush_and_sync().unwrap();

        let (temp_name, mut output) = storage.create_temp_output("brain.icnm").unwrap();
        assert_eq!(temp_name, "brain.icnm_0.tmp");
        output.write_all(b"new").unwrap();
        output.flush_and_sync().unwrap();
        drop(output);

        storage.rename_file(&temp_name, "brain.icnm").unwrap();

        assert!(!storage.file_exists(&temp_name));
        assert_eq!(storage.list_files().unwrap(), vec!["brain.icnm"]);

        let mut buffer = Vec::new();
        storage
            .open_input("brain.icnm")
            .unwrap()
            .read_to_end(&mut buffer)
            .unwrap();
        assert_eq!(buffer, b"new");
    }

    #[test]
    fn test_temp_output_leaves_existing_temp_file_alone() {
        let (_temp_dir, storage) = storage();

        let mut stale = storage.create_output("brain.icnm_0.tmp").unwrap();
        stale.write_all(b"in flight").unwrap();
        stale.flush_and_sync().unwrap();
        drop(stale);

        let (temp_name, mut output) = storage.create_temp_output("brain.icnm").unwrap();
        assert_eq!(temp_name, "brain.icnm_1.tmp");
        output.write_all(b"new").unwrap();
        output.flush_and_sync().unwrap();

        let mut buffer = Vec::new();
        storage
            .open_input("brain.icnm_0.tmp")
            .unwrap()
            .read_to_end(&mut buffer)
            .unwrap();
        assert_eq!(buffer, b"in flight");
    }

    #[test]
    fn test_file_not_found() {
        let (_temp_dir, storage) = storage();

        let result = storage.open_input("missing.icnm");
        assert!(matches!(result, Err(IntentError::Storage(msg)) if msg.contains("File not found")));

        storage.delete_file("missing.icnm").unwrap();
    }

    #[test]
    fn test_storage_close() {
        let (_temp_dir, mut storage) = storage();

        storage.close().unwrap();

        assert!(storage.create_output("brain.icnm").is_err());
        assert!(storage.open_input("brain.icnm").is_err());
        assert!(!storage.file_exists("brain.icnm"));
    }
}
