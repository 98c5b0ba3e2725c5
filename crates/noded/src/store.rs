// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Key-value config store module
//!
//! The node's mutable configuration store. Values written at runtime (such as
//! the concrete API address once a listener is bound) land here, and, when
//! the store is opened against a file, are rewritten to disk as a JSON map
//! on every put, so other processes can discover them.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use thiserror::Error;

/// Mutable key-value store, optionally persisted to a JSON file
#[derive(Debug, Default)]
pub struct ConfigStore {
    entries: RwLock<HashMap<String, String>>,
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Create a store that lives only in memory
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a store backed by the JSON file at `path`
    ///
    /// Existing contents are loaded; a missing file is treated as an empty
    /// store and created on the first put.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file exists but cannot be read or is not
    /// a valid JSON map.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Format {
                path: path.clone(),
                source,
            })?,
            Err(source) if source.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self {
            entries: RwLock::new(entries),
            path: Some(path),
        })
    }

    /// Insert or replace a value, flushing to disk when file-backed
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing file cannot be written.
    pub fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        if let Some(path) = &self.path {
            persist(path, &entries)?;
        }
        Ok(())
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

fn persist(path: &Path, entries: &HashMap<String, String>) -> Result<(), StoreError> {
    let raw = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Format {
        path: path.to_owned(),
        source,
    })?;
    fs::write(path, raw).map_err(|source| StoreError::Write {
        path: path.to_owned(),
        source,
    })
}

/// Failures reading or writing the config store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read
    #[error("Failed to read config store at {path}: {source}")]
    Read {
        /// Store file path
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// The backing file could not be written
    #[error("Failed to write config store at {path}: {source}")]
    Write {
        /// Store file path
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// The backing file is not a valid JSON map
    #[error("Config store at {path} is not a valid JSON map: {source}")]
    Format {
        /// Store file path
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}
