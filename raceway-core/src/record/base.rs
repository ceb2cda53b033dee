//! Base implementation of records.
use crate::error::CoreError;
use chrono::prelude::{DateTime, Local};
use std::{
    collections::{
        hash_map::{Iter, Keys},
        HashMap,
    },
    convert::Into,
};

/// Represents possible types of values in a [`Record`].
#[derive(Debug, Clone)]
pub enum RecordValue {
    /// A single floating-point value, typically used for metrics.
    Scalar(f32),

    /// A timestamp with local timezone.
    DateTime(DateTime<Local>),

    /// A 1-dimensional array of floating-point values.
    Array1(Vec<f32>),

    /// A text value.
    String(String),
}

/// A container of string-keyed [`RecordValue`]s.
#[derive(Debug, Clone)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets the value corresponding to the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Returns `true` if the record contains no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges records, the entries of `src` taking precedence.
    pub fn merge(mut self, src: Record) -> Self {
        self.0.extend(src.0);
        self
    }

    /// Gets a scalar value for the given key.
    pub fn get_scalar(&self, k: &str) -> Result<f32, CoreError> {
        match self
            .0
            .get(k)
            .ok_or_else(|| CoreError::RecordKeyNotFound(k.into()))?
        {
            RecordValue::Scalar(v) => Ok(*v),
            _ => Err(CoreError::RecordValueType(k.into())),
        }
    }

    /// Gets a 1-dimensional array value for the given key.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, CoreError> {
        match self
            .0
            .get(k)
            .ok_or_else(|| CoreError::RecordKeyNotFound(k.into()))?
        {
            RecordValue::Array1(v) => Ok(v.clone()),
            _ => Err(CoreError::RecordValueType(k.into())),
        }
    }

    /// Gets a string value for the given key.
    pub fn get_string(&self, k: &str) -> Result<String, CoreError> {
        match self
            .0
            .get(k)
            .ok_or_else(|| CoreError::RecordKeyNotFound(k.into()))?
        {
            RecordValue::String(s) => Ok(s.clone()),
            _ => Err(CoreError::RecordValueType(k.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_roundtrip() {
        let mut record = Record::from_scalar("loss", 0.5);
        record.insert("eps", RecordValue::Scalar(0.9));

        assert_eq!(record.get_scalar("loss").unwrap(), 0.5);
        assert_eq!(record.get_scalar("eps").unwrap(), 0.9);
        assert!(record.get_scalar("missing").is_err());
    }

    #[test]
    fn merge_prefers_src() {
        let record = Record::from_scalar("a", 1.0);
        let other = Record::from_scalar("a", 2.0).merge(Record::from_scalar("b", 3.0));
        let merged = record.merge(other);

        assert_eq!(merged.get_scalar("a").unwrap(), 2.0);
        assert_eq!(merged.get_scalar("b").unwrap(), 3.0);
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let mut record = Record::empty();
        record.insert("obs", RecordValue::Array1(vec![1.0, 2.0]));
        assert!(matches!(
            record.get_scalar("obs"),
            Err(CoreError::RecordValueType(_))
        ));
    }
}
