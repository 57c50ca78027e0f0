//! Cached session settings.
//!
//! A [`SessionState`] is the opaque bundle a client needs to resume an
//! authenticated session without a password: cookies, device identity,
//! user agent and whatever else the client chooses to keep. Values may be
//! binary, which plain JSON cannot carry, so the value model is a closed
//! enum rather than `serde_json::Value`. Encoding to disk lives in the
//! store crate.

use std::collections::BTreeMap;

/// Settings key holding the simulated device identity.
pub const DEVICE_ID_KEY: &str = "device_id";

// ============================================================================
// Setting Value
// ============================================================================

/// A single value inside a [`SessionState`].
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// JSON `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer too large for `i64`.
    UInt(u64),
    /// Floating point number. Non-finite values cannot be persisted.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Raw bytes (cookie jars and similar blobs).
    Bytes(Vec<u8>),
    /// Ordered list.
    Array(Vec<SettingValue>),
    /// Nested mapping.
    Object(BTreeMap<String, SettingValue>),
}

impl SettingValue {
    /// Returns the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the byte content, if this is a binary value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as `i64` when it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Returns a short type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for SettingValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Persisted session settings, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    values: BTreeMap<String, SettingValue>,
}

impl SessionState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<SettingValue>,
    ) -> Option<SettingValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Removes and returns the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.values.remove(key)
    }

    /// The cached device id, if one is present and is a non-empty string.
    pub fn device_id(&self) -> Option<&str> {
        self.get(DEVICE_ID_KEY)
            .and_then(SettingValue::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no fields are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.values.iter()
    }

    /// Consumes the state, returning the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, SettingValue> {
        self.values
    }
}

impl From<BTreeMap<String, SettingValue>> for SessionState {
    fn from(values: BTreeMap<String, SettingValue>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for SessionState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
