// src/cache.rs
//! Persistence for the recent-search list.
//!
//! The history store only ever needs two calls, `load` and `save`, against a
//! key-value location named by a fixed namespace. `FileStorage` keeps one
//! JSON file per namespace under the user's data directory; `MemoryStorage`
//! keeps everything in process.

use crate::error::StorageError;
use dirs::data_dir;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "recent-result";

/// Key-value persistence for the recent-search list
pub trait HistoryStorage {
    /// Persisted terms, most recent first. Missing data is an empty list.
    fn load(&self) -> Result<Vec<String>, StorageError>;

    fn save(&mut self, terms: &[String]) -> Result<(), StorageError>;
}

impl<S: HistoryStorage + ?Sized> HistoryStorage for Box<S> {
    fn load(&self) -> Result<Vec<String>, StorageError> {
        (**self).load()
    }

    fn save(&mut self, terms: &[String]) -> Result<(), StorageError> {
        (**self).save(terms)
    }
}

/// Get the directory where history files are stored
pub fn get_storage_dir() -> Option<PathBuf> {
    Some(data_dir()?.join("feed_search"))
}

/// One JSON file per namespace
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage for `namespace` inside `dir`
    pub fn new(dir: &Path, namespace: &str) -> Self {
        Self {
            path: dir.join(format!("{}.json", namespace)),
        }
    }

    /// Storage for `namespace` under the platform data directory
    pub fn in_data_dir(namespace: &str) -> Result<Self, StorageError> {
        let dir = get_storage_dir()
            .ok_or_else(|| StorageError::Unavailable("no data directory".to_string()))?;
        Ok(Self::new(&dir, namespace))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStorage for FileStorage {
    fn load(&self) -> Result<Vec<String>, StorageError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        if buffer.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&buffer)?)
    }

    fn save(&mut self, terms: &[String]) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        // Write aside and rename so a crash never leaves a truncated list
        let encoded = serde_json::to_string(terms)?;
        let staging = self.path.with_extension("json.tmp");
        let mut file = File::create(&staging)?;
        file.write_all(encoded.as_bytes())?;
        file.sync_all()?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// In-process storage. Clones share the same backing list.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    terms: Arc<Mutex<Vec<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `terms`
    pub fn with_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: Arc::new(Mutex::new(terms.into_iter().map(Into::into).collect())),
        }
    }

    /// Snapshot of what is currently persisted
    pub fn snapshot(&self) -> Vec<String> {
        self.terms
            .lock()
            .map(|terms| terms.clone())
            .unwrap_or_default()
    }
}

impl HistoryStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<String>, StorageError> {
        self.terms
            .lock()
            .map(|terms| terms.clone())
            .map_err(|_| StorageError::Unavailable("memory storage poisoned".to_string()))
    }

    fn save(&mut self, terms: &[String]) -> Result<(), StorageError> {
        let mut stored = self
            .terms
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage poisoned".to_string()))?;
        *stored = terms.to_vec();
        Ok(())
    }
}
