//! The wiki entry model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One wiki article.
///
/// Only `id` and `title` carry meaning for the core logic. Everything else
/// (`category`, `tags`, `content`, `updated`, and any field a future client
/// adds) is kept verbatim in `fields` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Identity used for merge collision detection. Unique within one store.
    pub id: i64,

    /// Human-readable title. Not guaranteed unique.
    #[serde(default)]
    pub title: String,

    /// Pass-through metadata, in the order the client sent it.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Entry {
    /// Creates an entry with no metadata.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            fields: Map::new(),
        }
    }

    /// Sets a pass-through field, returning the entry for chaining.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Parses a JSON document that must be an array of entries.
    pub fn parse_list(bytes: &[u8]) -> Result<Vec<Entry>, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serializes entries the way the store persists them: pretty-printed
    /// with two-space indentation.
    pub fn to_document(entries: &[Entry]) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(entries)
    }
}
