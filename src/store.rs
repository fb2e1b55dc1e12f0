//! Flat key/value store contracts and the in-memory implementation.
//!
//! The walk engine only depends on the [`KvGet`] and [`KvSet`] contracts;
//! [`MemoryStore`] is the canonical map-backed implementation and also
//! carries `KEY=value` env-file persistence.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// Prefix shared by environment variables and env-file keys.
pub const ENV_PREFIX: &str = "CFG_";

/// Write half of the flat store contract.
pub trait KvSet {
    fn set(&mut self, key: &str, value: &str);
}

/// Read half of the flat store contract.
pub trait KvGet {
    /// Existence-checked get.
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Get with the zero value for absent keys.
    fn get(&self, key: &str) -> &str {
        self.lookup(key).unwrap_or("")
    }
}

/// A very simple map-backed store satisfying both contracts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Persist the store as `CFG_<UPPERCASE_KEY>=<value>` lines, sorted by
    /// key so the file is deterministic.
    pub fn write_env_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut out = String::new();
        for (key, value) in entries {
            out.push_str(&format!("{ENV_PREFIX}{}={value}\n", key.to_ascii_uppercase()));
        }
        fs::write(&path, out)?;
        debug!(path = %path.as_ref().display(), entries = self.entries.len(), "wrote env file");
        Ok(())
    }

    /// Load `CFG_`-prefixed `KEY=value` lines from a file, lowercasing the
    /// keys. Blank lines, `#` comments, and lines without the prefix or an
    /// `=` are skipped. A missing file reads as an empty store, not an
    /// error.
    pub fn read_env_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            self.set(&key.to_ascii_lowercase(), value);
        }
        Ok(())
    }
}

impl KvSet for MemoryStore {
    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

impl KvGet for MemoryStore {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
