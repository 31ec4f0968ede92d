use serde::Serialize;
use serde_json::{Map, Value};

/// A key/value annotation on a changeset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// `{key: value}`, for re-serializing a single tag.
    pub fn as_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(self.key.clone(), Value::String(self.value.clone()));
        map
    }

    // OSM tag values are always strings; anything else is kept as its JSON text.
    pub(crate) fn from_entry(key: String, value: Value) -> Self {
        let value = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Self { key, value }
    }
}
