//! Raw movie records as delivered by the fetch client
//!
//! A raw record is kept as an untyped JSON document. Every accessor is a
//! safe optional lookup so a missing key, a `null`, or an unexpected shape
//! at any nesting level simply yields `None`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// One unparsed movie document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMovieRecord(Value);

impl RawMovieRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Top-level field, treating `null` the same as a missing key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Nested field reached through a chain of object keys
    pub fn path(&self, keys: &[&str]) -> Option<&Value> {
        let mut current = &self.0;
        for key in keys {
            current = current.get(*key)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// Array field; anything that is not an array reads as missing
    pub fn array(&self, keys: &[&str]) -> Option<&Vec<Value>> {
        self.path(keys).and_then(Value::as_array)
    }
}

/// Load a raw batch written by [`save_raw_records`]
pub fn load_raw_records(path: &Path) -> Result<Vec<RawMovieRecord>> {
    if !path.exists() {
        return Err(Error::RawDataNotFound(path.to_path_buf()));
    }

    debug!("Loading raw records from {:?}", path);
    let content = std::fs::read_to_string(path)?;
    let records: Vec<RawMovieRecord> = serde_json::from_str(&content)?;
    info!(count = records.len(), path = %path.display(), "Loaded raw records");
    Ok(records)
}

/// Persist a raw batch as a pretty-printed JSON array
pub fn save_raw_records(path: &Path, records: &[RawMovieRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(records)?;
    std::fs::write(path, content)?;
    info!(count = records.len(), path = %path.display(), "Saved raw records");
    Ok(())
}
