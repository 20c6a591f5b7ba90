//! Record identifiers and the loosely-typed document shape every collection stores.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::StoreError;

/// A stored record: string keys mapped to arbitrary JSON values.
pub type Document = Map<String, Value>;

/// Field carrying the store-assigned identifier on every returned record.
pub const ID_FIELD: &str = "_id";

/// Store-assigned record identifier, unique per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for RecordId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| StoreError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Attach `_id` to a stored body for the API.
pub fn with_id(id: RecordId, mut body: Document) -> Document {
    body.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    body
}

/// Drop any client-supplied `_id`; identifiers only come from the store.
pub fn strip_id(document: &mut Document) {
    document.remove(ID_FIELD);
}

/// `$set` semantics: overwrite top-level keys. Returns whether anything changed.
pub fn apply_set(target: &mut Document, partial: &Document) -> bool {
    let mut changed = false;
    for (key, value) in partial {
        if target.get(key) != Some(value) {
            target.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::CorruptRecord(other.to_string())),
    }
}

pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(document)).map_err(Into::into)
}
