//! Named field values loaded from TOML.
//!
//! Test cases describe packets, entries and options as flat TOML tables keyed
//! by the field names of [`schema`](crate::schema):
//!
//! ```toml
//! service_id = 0x1234
//! method_id = 0x0421
//! interface_version = 1
//! message_type = 0
//! return_code = 0
//! payload = [1, 2]
//! ```
//!
//! Integers are checked against the schema width when a value is built from
//! the map, so an out-of-range entry fails the same way as a typed
//! constructor would. Byte fields (`payload`, `entries_array`,
//! `options_array`) must be integer arrays; a string such as `"0102"` is
//! rejected rather than read as text or hex.

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use serde::Deserialize;

use crate::config::ConfigError;
use crate::error::{Result, SomeIpError};
use crate::schema::Field;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Bytes(value)
    }
}

/// Field name to value map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    values: BTreeMap<String, FieldValue>,
}

impl FieldMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a map from TOML text.
    pub fn from_toml(content: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a map from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Copy every field of `other` into this map, overwriting on conflict.
    pub fn merge(&mut self, other: &FieldMap) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Look up a raw value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Check if a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Read a required integer field, checked against its schema width.
    pub fn uint<T: TryFrom<u128>>(&self, field: &Field) -> Result<T> {
        match self.get(field.name()) {
            Some(value) => Self::to_uint(field, value),
            None => Err(SomeIpError::MissingField(field.name())),
        }
    }

    /// Read an optional integer field, falling back to `default`.
    pub fn uint_or<T: TryFrom<u128>>(&self, field: &Field, default: T) -> Result<T> {
        match self.get(field.name()) {
            Some(value) => Self::to_uint(field, value),
            None => Ok(default),
        }
    }

    /// Read a required string field.
    pub fn text(&self, field: &Field) -> Result<&str> {
        match self.get(field.name()) {
            Some(FieldValue::Text(text)) => Ok(text),
            Some(other) => Err(Self::type_error(field, "a string", other)),
            None => Err(SomeIpError::MissingField(field.name())),
        }
    }

    /// Read an optional byte field. A missing field is empty.
    ///
    /// Only an array of integers (each 0-255) is accepted; strings are a
    /// type error.
    pub fn bytes(&self, field: &Field) -> Result<Bytes> {
        match self.get(field.name()) {
            Some(FieldValue::Bytes(bytes)) => Ok(Bytes::copy_from_slice(bytes)),
            Some(other) => Err(Self::type_error(field, "a byte array", other)),
            None => Ok(Bytes::new()),
        }
    }

    fn to_uint<T: TryFrom<u128>>(field: &Field, value: &FieldValue) -> Result<T> {
        let raw = match value {
            FieldValue::Int(raw) => *raw,
            other => return Err(Self::type_error(field, "an integer", other)),
        };
        let unsigned = u128::try_from(raw).map_err(|_| {
            SomeIpError::Config(ConfigError::Invalid(format!(
                "field {} must be non-negative, got {raw}",
                field.name()
            )))
        })?;
        field.check(unsigned)?;
        T::try_from(unsigned).map_err(|_| field.range_error(unsigned))
    }

    fn type_error(field: &Field, expected: &str, got: &FieldValue) -> SomeIpError {
        SomeIpError::Config(ConfigError::Invalid(format!(
            "field {} must be {expected}, got {got:?}",
            field.name()
        )))
    }
}
