//! Agent.
use super::{Env, Policy, ReplayBufferBase};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env, R: ReplayBufferBase>: Policy<E> {
    /// Sets the policy to training mode.
    fn train(&mut self);

    /// Sets the policy to evaluation mode.
    fn eval(&mut self);

    /// Returns `true` if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step.
    ///
    /// `buffer` is a replay buffer from which transition batches are taken
    /// for updating model parameters. Returns `None` when the step is
    /// skipped, for example during the warm-up period while the buffer
    /// holds fewer transitions than a batch.
    fn opt(&mut self, buffer: &mut R) -> Option<Record>;

    /// Saves the parameters of the agent in the given directory.
    ///
    /// This method commonly creates a number of files in the directory.
    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()>;

    /// Loads the parameters of the agent from the given directory.
    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()>;
}
