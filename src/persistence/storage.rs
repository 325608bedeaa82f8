use super::files::{atomic_write, read_file};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Flat string-to-string store; every value is a JSON document.
///
/// File-backed stores rewrite the whole file on each `set`. In-memory stores
/// never touch disk.
#[derive(Debug, Default)]
pub struct KeyValueStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl KeyValueStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_file(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "storage file is corrupt; starting empty");
                BTreeMap::new()
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read storage file; starting empty");
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            entries,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_raw(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    /// Decode a value; `None` when missing or malformed
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed stored value");
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("Failed to encode value for {}", key))?;
        self.set_raw(key, raw)
    }

    /// Set several keys with a single write
    pub fn set_many(&mut self, values: Vec<(&str, String)>) -> Result<()> {
        for (key, raw) in values {
            self.entries.insert(key.to_string(), raw);
        }
        self.flush()
    }

    pub fn remove(&mut self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.entries.remove(*key);
        }
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.entries)?;
        atomic_write(path, &json)
    }
}
