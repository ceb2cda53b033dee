//! A raycast driving agent trained with deep Q-learning.
//!
//! The workspace consists of the following crates:
//!
//! * [raceway-core](../raceway_core/index.html) provides the traits
//!   connecting environments, agents and replay buffers, the uniform
//!   replay buffer and the synchronous training loop.
//! * [raceway-candle-agent](../raceway_candle_agent/index.html) implements
//!   the DQN agent on [candle](https://crates.io/crates/candle-core): an
//!   MLP action-value estimator, an epsilon-greedy explorer and the
//!   one-step bootstrapped update rule.
//! * [raceway-track-env](../raceway_track_env/index.html) is the driving
//!   simulation: a ring circuit stored as an occupancy grid, kinematic car
//!   motion and raycast perception.
//!
//! This crate re-exports the three and ships the `train` binary.
pub use raceway_candle_agent;
pub use raceway_core;
pub use raceway_track_env;
