//! A recorder writing aggregated scalars through the `log` crate.
use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::info;

/// Writes aggregated scalar records as log lines.
///
/// Scalars stored between flushes are averaged by a [`RecordStorage`] and
/// emitted at `info` level, keyed by the optimization step.
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Constructs a [`LogRecorder`].
    pub fn new() -> Self {
        Self {
            storage: RecordStorage::new(),
        }
    }
}

impl Default for LogRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder for LogRecorder {
    /// Writes the scalar values of the given record immediately.
    fn write(&mut self, record: Record) {
        for (k, v) in record.iter() {
            if let RecordValue::Scalar(v) = v {
                info!("{}: {}", k, v);
            }
        }
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let aggregated = self.storage.aggregate();
        for (k, v) in aggregated.iter() {
            if let RecordValue::Scalar(v) = v {
                info!("opt_steps: {}, {}: {}", step, k, v);
            }
        }
    }
}
