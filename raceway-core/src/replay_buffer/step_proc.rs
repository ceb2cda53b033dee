//! One-step transition processing.
use super::{BatchBase, ReplayBatch};
use crate::{Env, Obs, StepProcessor};
use std::{default::Default, marker::PhantomData};

/// Configuration of [`OneStepProcessor`].
#[derive(Clone, Debug)]
pub struct OneStepProcessorConfig {}

impl Default for OneStepProcessorConfig {
    fn default() -> Self {
        Self {}
    }
}

/// Converts environment steps into 1-step TD transitions.
///
/// The processor keeps the previous observation `o_t` and combines it with
/// the step's `(a_t, o_t+1, r_t, done_t)` into a [`ReplayBatch`] holding a
/// single transition. When an episode ends, the initial observation of the
/// next episode (carried in [`Step::init_obs`](crate::Step)) becomes the
/// new previous observation.
///
/// # Type Parameters
///
/// * `E` - The environment type
/// * `O` - Observation storage, `BatchBase + From<E::Obs>`
/// * `A` - Action storage, `BatchBase + From<E::Act>`
pub struct OneStepProcessor<E, O, A> {
    /// The previous observation, used to construct transitions.
    prev_obs: Option<O>,
    phantom: PhantomData<(E, A)>,
}

impl<E, O, A> StepProcessor<E> for OneStepProcessor<E, O, A>
where
    E: Env,
    O: BatchBase + From<E::Obs>,
    A: BatchBase + From<E::Act>,
{
    type Config = OneStepProcessorConfig;
    type Output = ReplayBatch<O, A>;

    fn build(_config: &Self::Config) -> Self {
        Self {
            prev_obs: None,
            phantom: PhantomData,
        }
    }

    fn reset(&mut self, init_obs: E::Obs) {
        self.prev_obs = Some(init_obs.into());
    }

    /// Processes a step into a single-transition batch.
    ///
    /// # Panics
    ///
    /// Panics if the step carries more than one observation, if `reset()`
    /// has not been called before the first step, or if a terminal step
    /// does not carry the initial observation of the next episode.
    fn process(&mut self, step: crate::Step<E>) -> Self::Output {
        assert_eq!(step.obs.len(), 1);

        let is_done = step.is_done();
        let next_obs = step.obs.clone().into();
        let obs = self
            .prev_obs
            .replace(step.obs.into())
            .expect("prev_obs is not set. Forgot to call reset()?");
        let act = step.act.into();

        if is_done {
            self.prev_obs
                .replace(step.init_obs.expect("Failed to unwrap init_obs").into());
        }

        ReplayBatch {
            obs,
            act,
            next_obs,
            reward: step.reward,
            is_done: step.is_done,
        }
    }
}
