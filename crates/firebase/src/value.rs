//! Conversion between plain JSON and Firestore REST typed values.
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...). Models are
//! serialized to plain JSON with `serde_json` first and then encoded here, so
//! the serde attributes on the models define the stored shape.
//!
//! Timestamps have no JSON representation. They decode to RFC 3339 strings,
//! and a string field whose name ends in `At` (`createdAt`, `updatedAt`) is
//! encoded back as a `timestampValue` when it parses as RFC 3339.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value, json};

use crate::error::{FirebaseError, Result};

fn codec_error(message: impl Into<String>) -> FirebaseError {
    FirebaseError::Codec(message.into())
}

/// Encode a JSON object into a Firestore `fields` map.
#[must_use]
pub fn encode_fields(fields: &Map<String, Value>) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_field(key, value)))
        .collect();
    Value::Object(encoded)
}

fn encode_field(key: &str, value: &Value) -> Value {
    if key.ends_with("At")
        && let Value::String(s) = value
        && let Ok(timestamp) = DateTime::parse_from_rfc3339(s)
    {
        let utc = timestamp.with_timezone(&Utc);
        return json!({ "timestampValue": utc.to_rfc3339_opts(SecondsFormat::Micros, true) });
    }
    encode_value(value)
}

/// Encode a single JSON value.
#[must_use]
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => json!({ "integerValue": i.to_string() }),
            (None, Some(f)) => json!({ "doubleValue": f }),
            (None, None) => json!({ "stringValue": n.to_string() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Decode the `fields` of a Firestore document (or `mapValue`).
///
/// A document without a `fields` key has no user fields and decodes to an
/// empty object.
///
/// # Errors
///
/// Returns [`FirebaseError::Codec`] if any value is malformed.
pub fn decode_fields(document: &Value) -> Result<Map<String, Value>> {
    let Some(fields) = document.get("fields") else {
        return Ok(Map::new());
    };
    let fields = fields
        .as_object()
        .ok_or_else(|| codec_error("'fields' must be an object"))?;

    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Decode a single typed value.
///
/// # Errors
///
/// Returns [`FirebaseError::Codec`] for unknown or malformed value types.
pub fn decode_value(value: &Value) -> Result<Value> {
    let object = value
        .as_object()
        .ok_or_else(|| codec_error("expected a Firestore value object"))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| codec_error("empty Firestore value"))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| codec_error("booleanValue must be a bool")),
        "integerValue" => decode_integer(inner),
        "doubleValue" => Ok(decode_double(inner)),
        "timestampValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| codec_error("timestampValue must be a string"))?;
            let parsed = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| codec_error(format!("invalid timestampValue '{raw}': {e}")))?;
            Ok(Value::String(
                parsed
                    .with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ))
        }
        "stringValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| codec_error(format!("{kind} must be a string"))),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(decode_value).collect::<Result<_>>()?,
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => decode_fields(inner).map(Value::Object),
        other => Err(codec_error(format!("unknown Firestore value type '{other}'"))),
    }
}

fn decode_integer(inner: &Value) -> Result<Value> {
    let parsed = match inner {
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|e| codec_error(format!("invalid integerValue '{s}': {e}")))?,
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| codec_error("integerValue out of range"))?,
        _ => return Err(codec_error("integerValue must be a string or number")),
    };
    Ok(Value::Number(parsed.into()))
}

/// `NaN` and infinities have no JSON form and decode to `null`.
fn decode_double(inner: &Value) -> Value {
    let parsed = match inner {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_product_fields() {
        let fields = json!({
            "name": "Sony FX3",
            "pricePerDay": 85.5,
            "order": 2,
            "inStock": true,
            "brandId": null,
            "images": ["a.jpg"],
            "specs": [{"label": "Mount", "value": "E"}],
            "createdAt": "2024-03-01T10:00:00Z",
            "description": "2024-03-01T10:00:00Z"
        });
        let encoded = encode_fields(fields.as_object().unwrap());

        assert_eq!(encoded["name"], json!({"stringValue": "Sony FX3"}));
        assert_eq!(encoded["pricePerDay"], json!({"doubleValue": 85.5}));
        assert_eq!(encoded["order"], json!({"integerValue": "2"}));
        assert_eq!(encoded["inStock"], json!({"booleanValue": true}));
        assert_eq!(encoded["brandId"], json!({"nullValue": null}));
        assert_eq!(
            encoded["images"],
            json!({"arrayValue": {"values": [{"stringValue": "a.jpg"}]}})
        );
        assert_eq!(
            encoded["specs"]["arrayValue"]["values"][0]["mapValue"]["fields"]["label"],
            json!({"stringValue": "Mount"})
        );
        assert_eq!(
            encoded["createdAt"],
            json!({"timestampValue": "2024-03-01T10:00:00.000000Z"})
        );
        // Only `*At` fields are treated as timestamps.
        assert_eq!(
            encoded["description"],
            json!({"stringValue": "2024-03-01T10:00:00Z"})
        );
    }

    #[test]
    fn test_decode_document() {
        let document = json!({
            "name": "projects/p/databases/(default)/documents/products/abc",
            "fields": {
                "name": {"stringValue": "Sony FX3"},
                "pricePerDay": {"integerValue": "85"},
                "deposit": {"doubleValue": 500.25},
                "createdAt": {"timestampValue": "2024-03-01T10:00:00.123456Z"},
                "tags": {"arrayValue": {}},
                "meta": {"mapValue": {"fields": {"n": {"nullValue": null}}}}
            }
        });
        let fields = decode_fields(&document).unwrap();

        assert_eq!(fields["name"], json!("Sony FX3"));
        assert_eq!(fields["pricePerDay"], json!(85));
        assert_eq!(fields["deposit"], json!(500.25));
        assert_eq!(fields["createdAt"], json!("2024-03-01T10:00:00.123456Z"));
        assert_eq!(fields["tags"], json!([]));
        assert_eq!(fields["meta"], json!({"n": null}));
    }

    #[test]
    fn test_decode_document_without_fields() {
        let fields = decode_fields(&json!({"name": "x"})).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let result = decode_value(&json!({"mysteryValue": 1}));
        assert!(matches!(result, Err(FirebaseError::Codec(_))));
    }

    #[test]
    fn test_decode_nan_as_null() {
        assert_eq!(decode_value(&json!({"doubleValue": "NaN"})).unwrap(), Value::Null);
    }
}
