#![warn(missing_docs)]
//! Backend-agnostic building blocks for training the raceway driving agent.
//!
//! This crate defines the traits connecting an environment, a trainable
//! policy and a replay buffer, together with a synchronous training loop.
//! Concrete neural-network agents live in `raceway-candle-agent` and the
//! driving simulation lives in `raceway-track-env`.
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Act, Agent, Env, ExperienceBufferBase, Info, Obs, Policy, ReplayBufferBase, Step,
    StepProcessor, TransitionBatch,
};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{Sampler, Trainer, TrainerConfig};

pub mod util;
