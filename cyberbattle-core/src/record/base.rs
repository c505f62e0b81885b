//! Base implementation of records.
use crate::error::CyberBattleError;
use std::collections::{hash_map::Iter, HashMap};

/// Value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, e.g. a reward or a loss.
    Scalar(f32),
}

/// A set of key-value pairs.
#[derive(Debug, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Inserts a key-value pair, overwriting any previous value.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Gets a scalar value.
    pub fn get_scalar(&self, k: &str) -> Result<f32, CyberBattleError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            None => Err(CyberBattleError::RecordKeyError(k.to_string())),
        }
    }

    /// Number of key-value pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites() {
        let mut record = Record::from_scalar("epsilon", 0.9);
        record.insert("epsilon", RecordValue::Scalar(0.8));
        record.insert("loss", RecordValue::Scalar(1.0));
        assert_eq!(record.len(), 2);
        assert_eq!(record.get_scalar("epsilon"), Ok(0.8));
        assert_eq!(
            record.get_scalar("total_reward"),
            Err(CyberBattleError::RecordKeyError("total_reward".to_string()))
        );
    }
}
