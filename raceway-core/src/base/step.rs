//! Environment step.
use super::Env;

/// Additional information attached to [`Step`] beyond observation and reward.
pub trait Info {}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits a [`Step`] object at every interaction step.
/// These objects are turned into transitions `(o_t, a_t, o_t+1, r_t)` by a
/// [`StepProcessor`].
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: Vec<f32>,

    /// Flag denoting if the episode ended at this step.
    ///
    /// A single flag is used for both collisions and step-limit cutoffs;
    /// there is no separate truncation flag.
    pub is_done: Vec<i8>,

    /// Information defined by the environment.
    pub info: E::Info,

    /// Initial observation of the next episode. `None` unless the episode
    /// ended at this step and the environment has been reset.
    pub init_obs: Option<E::Obs>,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: Vec<f32>,
        is_done: Vec<i8>,
        info: E::Info,
        init_obs: Option<E::Obs>,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_done,
            info,
            init_obs,
        }
    }

    /// Returns `true` if the episode ended at this step.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.is_done[0] == 1
    }
}

/// Processes a [`Step`] object and outputs an item [`Self::Output`].
///
/// This trait is used in [`Trainer`](crate::Trainer). The output is pushed
/// into a replay buffer implementing
/// [`ExperienceBufferBase`](crate::ExperienceBufferBase), so
/// [`Self::Output`] should match
/// [`ExperienceBufferBase::Item`](crate::ExperienceBufferBase::Item).
///
/// [`Self::Output`]: StepProcessor::Output
pub trait StepProcessor<E: Env> {
    /// Configuration.
    type Config: Clone;

    /// The type of transitions produced by this object.
    type Output;

    /// Builds a processor.
    fn build(config: &Self::Config) -> Self;

    /// Resets the object with the initial observation of an episode.
    fn reset(&mut self, init_obs: E::Obs);

    /// Processes a [`Step`] object into a transition.
    fn process(&mut self, step: Step<E>) -> Self::Output;
}
