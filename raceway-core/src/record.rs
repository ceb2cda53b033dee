//! Types and traits for recording training metrics.
//!
//! A [`Record`] is a keyed map of [`RecordValue`]s emitted by environments,
//! agents and the training loop. Recorders consume records:
//!
//! * [`Recorder`] - writes individual records
//! * [`AggregateRecorder`] - stores records and writes aggregated values
//! * [`NullRecorder`] - discards everything
//! * [`BufferedRecorder`] - keeps records in memory, used for evaluation runs
//! * [`LogRecorder`] - writes aggregated scalars through the `log` crate
//! * [`RecordStorage`] - aggregation backend for [`AggregateRecorder`]s
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
