//! Firestore documents as plain JSON objects.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{FirebaseError, Result};

/// Plain-JSON field map of a document.
pub type Fields = Map<String, Value>;

/// A document read from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub collection: String,
    pub id: String,
    pub fields: Fields,
}

impl Document {
    #[must_use]
    pub fn new(collection: impl Into<String>, id: impl Into<String>, fields: Fields) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            fields,
        }
    }

    /// Deserialize into a model, injecting the document ID as field `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FirebaseError::Decode`] if the fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(fields)).map_err(|source| FirebaseError::Decode {
            collection: self.collection.clone(),
            id: self.id.clone(),
            source,
        })
    }
}

/// Serialize a model into a document field map.
///
/// # Errors
///
/// Returns [`FirebaseError::Codec`] if `value` does not serialize to an object.
pub fn to_fields<T: Serialize + ?Sized>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(FirebaseError::Codec(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Extract the trailing document ID from a full resource name
/// (`projects/p/databases/(default)/documents/products/abc` → `abc`).
pub(crate) fn id_from_name(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}
