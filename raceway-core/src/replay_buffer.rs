//! Uniform experience replay for the driving agent.
//!
//! This module implements a fixed-capacity circular replay buffer over
//! generic slot storage:
//!
//! - [`UniformReplayBuffer`]: circular buffer with uniform sampling of
//!   distinct transitions
//! - [`ReplayBatch`]: a generic batch of transitions
//! - [`OneStepProcessor`]: converts environment steps into 1-step TD
//!   transitions
//!
//! Observations and actions are stored in types implementing [`BatchBase`],
//! so the buffer itself is independent of the tensor backend.
mod base;
mod batch;
mod config;
mod step_proc;
pub use base::UniformReplayBuffer;
pub use batch::{BatchBase, ReplayBatch};
pub use config::UniformReplayBufferConfig;
pub use step_proc::{OneStepProcessor, OneStepProcessorConfig};
