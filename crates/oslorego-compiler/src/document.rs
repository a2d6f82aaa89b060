//! oslo.policy documents.
//!
//! A document is a YAML or JSON mapping from policy name to rule expression.
//! Key order is preserved so the generated module follows the input.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::debug;

use crate::error::{CompilerError, Result};

/// An ordered mapping of policy name to raw rule value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDocument {
    entries: IndexMap<String, Value>,
}

impl PolicyDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses a document from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid document.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "Reading policy document");

        let source = fs::read_to_string(path).map_err(|e| CompilerError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        source.parse()
    }

    /// Adds or replaces an entry, keeping the position of an existing key.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Returns the raw value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is a policy in this document.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over policy names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the document has no policies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for PolicyDocument {
    type Err = CompilerError;

    /// Parses YAML or JSON. Empty input gives an empty document.
    fn from_str(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::new());
        }
        let entries: Option<IndexMap<String, Value>> = serde_yaml::from_str(source)?;
        Ok(Self {
            entries: entries.unwrap_or_default(),
        })
    }
}
