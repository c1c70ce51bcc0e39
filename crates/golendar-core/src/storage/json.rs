//! Whole-file JSON persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// A single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write raw bytes, replacing the file through a temporary sibling.
    pub fn save(&self, data: &[u8]) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)
    }

    /// Read raw bytes. A missing file reads as empty.
    pub fn load(&self) -> Result<Vec<u8>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn save_json<T: Serialize>(&self, value: &T) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(value).map_err(StorageError::Encode)?;
        self.save(&data)
    }

    /// Decode the document, or `T::default()` for a missing or blank file.
    pub fn load_json<T: DeserializeOwned + Default>(&self) -> Result<T, StorageError> {
        let data = self.load()?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&data).map_err(StorageError::Decode)
    }
}
