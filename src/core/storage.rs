//! JSON document persistence shared by the user and history stores.
//!
//! Each store keeps one document in memory and rewrites the whole file on
//! every change.

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("'{0}' already exists")]
    Conflict(String),
}

/// Load a document, treating a missing or unreadable file as empty.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt document {:?}: {}", path, e);
            T::default()
        }),
        Err(e) => {
            log::warn!("Failed to read {:?}: {}", path, e);
            T::default()
        }
    }
}

/// Write a document as pretty JSON, creating the parent directory.
pub fn save<T: Serialize>(path: &Path, document: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(document)?;
    fs::write(path, content)?;
    Ok(())
}
