//! Record storage and aggregation.
use super::{Record, RecordValue};
use std::collections::HashSet;

/// Stores records and aggregates them on demand.
///
/// Scalar values are aggregated to their mean over the stored records;
/// for other value types the most recent occurrence wins.
pub struct RecordStorage {
    data: Vec<Record>,
}

fn mean(vs: &Vec<f32>) -> RecordValue {
    RecordValue::Scalar(vs.iter().map(|v| *v).sum::<f32>() / vs.len() as f32)
}

impl RecordStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn keys(&self) -> HashSet<String> {
        let mut keys = HashSet::new();
        for record in self.data.iter() {
            for k in record.keys() {
                keys.insert(k.clone());
            }
        }
        keys
    }

    fn latest(&self, key: &str) -> Option<RecordValue> {
        for record in self.data.iter().rev() {
            if let Some(value) = record.get(key) {
                return Some(value.clone());
            }
        }
        None
    }

    /// Aggregates the stored records into a single record and clears the
    /// storage.
    pub fn aggregate(&mut self) -> Record {
        let mut aggregated = Record::empty();

        for key in self.keys() {
            let scalars: Vec<f32> = self
                .data
                .iter()
                .filter_map(|record| match record.get(&key) {
                    Some(RecordValue::Scalar(v)) => Some(*v),
                    _ => None,
                })
                .collect();

            let value = if scalars.is_empty() {
                self.latest(&key)
            } else {
                Some(mean(&scalars))
            };
            if let Some(value) = value {
                aggregated.insert(key, value);
            }
        }

        self.data = Vec::new();
        aggregated
    }
}

impl Default for RecordStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_aggregate_to_mean() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_scalar("loss", 1.0));
        storage.store(Record::from_scalar("loss", 3.0));

        let aggregated = storage.aggregate();
        assert_eq!(aggregated.get_scalar("loss").unwrap(), 2.0);
        assert!(storage.is_empty());
    }

    #[test]
    fn latest_non_scalar_wins() {
        let mut storage = RecordStorage::new();
        let mut r1 = Record::empty();
        r1.insert("note", RecordValue::String("first".into()));
        let mut r2 = Record::empty();
        r2.insert("note", RecordValue::String("second".into()));
        storage.store(r1);
        storage.store(r2);

        let aggregated = storage.aggregate();
        assert_eq!(aggregated.get_string("note").unwrap(), "second");
    }
}
