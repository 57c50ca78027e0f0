//! Tagged JSON encoding for session settings.
//!
//! JSON has no binary type, so a [`SettingValue::Bytes`] is written as a
//! small tagged object:
//!
//! ```json
//! { "__class__": "bytes", "__value__": "c2Vzc2lvbmlkPTE=" }
//! ```
//!
//! Decoding recognizes the tag on any object at any depth and turns it
//! back into bytes. Every other JSON value maps one-to-one onto a
//! [`SettingValue`].

use base64::prelude::*;
use followfeed_core::{SessionState, SettingValue};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::error::StoreError;

/// Tag key naming the wrapped type.
pub const CLASS_KEY: &str = "__class__";

/// Tag key holding the base64 payload.
pub const VALUE_KEY: &str = "__value__";

/// Class name for binary payloads.
pub const BYTES_CLASS: &str = "bytes";

// ============================================================================
// Encoding
// ============================================================================

/// Encodes a whole session state into a JSON object.
pub fn encode_state(state: &SessionState) -> Result<Value, StoreError> {
    let mut map = Map::new();
    for (key, value) in state.iter() {
        map.insert(key.clone(), encode_at(value, key)?);
    }
    Ok(Value::Object(map))
}

/// Encodes a single value.
pub fn encode_value(value: &SettingValue) -> Result<Value, StoreError> {
    encode_at(value, "$")
}

fn encode_at(value: &SettingValue, key_path: &str) -> Result<Value, StoreError> {
    Ok(match value {
        SettingValue::Null => Value::Null,
        SettingValue::Bool(b) => Value::Bool(*b),
        SettingValue::Int(n) => Value::Number(Number::from(*n)),
        SettingValue::UInt(n) => Value::Number(Number::from(*n)),
        SettingValue::Float(f) => {
            Value::Number(Number::from_f64(*f).ok_or_else(|| StoreError::Unserializable {
                key_path: key_path.to_string(),
                value: format!("{f:?}"),
            })?)
        }
        SettingValue::String(s) => Value::String(s.clone()),
        SettingValue::Bytes(bytes) => {
            let mut tagged = Map::new();
            tagged.insert(CLASS_KEY.to_string(), Value::String(BYTES_CLASS.to_string()));
            tagged.insert(VALUE_KEY.to_string(), Value::String(BASE64_STANDARD.encode(bytes)));
            Value::Object(tagged)
        }
        SettingValue::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| encode_at(item, &format!("{key_path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        SettingValue::Object(fields) => {
            let mut map = Map::new();
            for (key, item) in fields {
                map.insert(key.clone(), encode_at(item, &format!("{key_path}.{key}"))?);
            }
            Value::Object(map)
        }
    })
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a JSON document into a session state.
///
/// The document must be an object.
pub fn decode_state(value: Value) -> Result<SessionState, StoreError> {
    match decode_value(value)? {
        SettingValue::Object(fields) => Ok(SessionState::from(fields)),
        other => Err(StoreError::Decode(format!(
            "expected an object at the top level, found {}",
            other.type_name()
        ))),
    }
}

/// Decodes a single JSON value, unwrapping tagged binaries at any depth.
pub fn decode_value(value: Value) -> Result<SettingValue, StoreError> {
    Ok(match value {
        Value::Null => SettingValue::Null,
        Value::Bool(b) => SettingValue::Bool(b),
        Value::Number(n) => decode_number(&n),
        Value::String(s) => SettingValue::String(s),
        Value::Array(items) => SettingValue::Array(
            items
                .into_iter()
                .map(decode_value)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            if is_bytes_tag(&map) {
                return decode_bytes(&map).map(SettingValue::Bytes);
            }
            let mut fields = BTreeMap::new();
            for (key, item) in map {
                fields.insert(key, decode_value(item)?);
            }
            SettingValue::Object(fields)
        }
    })
}

fn decode_number(n: &Number) -> SettingValue {
    if let Some(i) = n.as_i64() {
        SettingValue::Int(i)
    } else if let Some(u) = n.as_u64() {
        SettingValue::UInt(u)
    } else {
        // serde_json numbers are always finite.
        SettingValue::Float(n.as_f64().unwrap_or_default())
    }
}

fn is_bytes_tag(map: &Map<String, Value>) -> bool {
    map.get(CLASS_KEY).and_then(Value::as_str) == Some(BYTES_CLASS)
}

fn decode_bytes(map: &Map<String, Value>) -> Result<Vec<u8>, StoreError> {
    let encoded = map
        .get(VALUE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode(format!("bytes tag without a string {VALUE_KEY}")))?;

    // MIME-style writers wrap lines; the payload itself never contains whitespace.
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| StoreError::Decode(format!("invalid base64 in bytes tag: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bytes_encode_to_tag() {
        let encoded = encode_value(&SettingValue::Bytes(b"hello".to_vec())).unwrap();
        assert_eq!(encoded, json!({ "__class__": "bytes", "__value__": "aGVsbG8=" }));
    }

    #[test]
    fn test_plain_values_pass_through() {
        let doc = json!({
            "device_id": "android-1234567890abcdef",
            "created_ts": 1_600_000_000,
            "ratio": 0.5,
            "flags": [true, false, null],
            "nested": { "ua": "Instagram 10.26.0" }
        });
        let state = decode_state(doc.clone()).unwrap();
        assert_eq!(encode_state(&state).unwrap(), doc);
    }

    #[test]
    fn test_nested_bytes_roundtrip() {
        let payload: Vec<u8> = (0u8..=255).collect();
        let mut inner = BTreeMap::new();
        inner.insert("jar".to_string(), SettingValue::Bytes(payload.clone()));
        inner.insert("name".to_string(), SettingValue::from("cookies"));

        let mut state = SessionState::new();
        state.insert("cookie", SettingValue::Bytes(b"\x80\x04\x95binary".to_vec()));
        state.insert("nested", SettingValue::Object(inner));
        state.insert(
            "list",
            SettingValue::Array(vec![SettingValue::Bytes(vec![]), SettingValue::Int(3)]),
        );

        let decoded = decode_state(encode_state(&state).unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_decode_tolerates_mime_line_breaks() {
        let doc = json!({ "__class__": "bytes", "__value__": "aGVs\nbG8=\n" });
        assert_eq!(decode_value(doc).unwrap(), SettingValue::Bytes(b"hello".to_vec()));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let doc = json!({ "__class__": "bytes", "__value__": "not base64!!" });
        assert!(matches!(decode_value(doc), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_decode_tag_without_value() {
        let doc = json!({ "__class__": "bytes" });
        assert!(matches!(decode_value(doc), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_other_class_is_a_plain_object() {
        let doc = json!({ "__class__": "datetime", "__value__": "2020-01-01" });
        let decoded = decode_value(doc).unwrap();
        assert!(matches!(decoded, SettingValue::Object(ref m) if m.len() == 2));
    }

    #[test]
    fn test_non_finite_float_is_unserializable() {
        let mut state = SessionState::new();
        state.insert(
            "timing",
            SettingValue::Array(vec![SettingValue::Float(1.0), SettingValue::Float(f64::NAN)]),
        );

        let err = encode_state(&state).unwrap_err();
        match err {
            StoreError::Unserializable { key_path, value } => {
                assert_eq!(key_path, "timing[1]");
                assert_eq!(value, "NaN");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(matches!(decode_state(json!([1, 2])), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_large_unsigned_survives() {
        let doc = json!({ "pk": u64::MAX });
        let state = decode_state(doc.clone()).unwrap();
        assert_eq!(state.get("pk"), Some(&SettingValue::UInt(u64::MAX)));
        assert_eq!(encode_state(&state).unwrap(), doc);
    }
}
