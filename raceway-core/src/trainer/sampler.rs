//! Experience sampling.
use crate::{record::Record, record::RecordValue, Env, ExperienceBufferBase, Policy, StepProcessor};
use anyhow::Result;
use std::time::SystemTime;

/// Manages the sampling of experiences from the environment.
///
/// This struct handles the interaction between the policy and the
/// environment, converts the resulting steps into transitions with a
/// [`StepProcessor`] and pushes them into a replay buffer. It also keeps
/// per-episode return statistics and an environment-steps-per-second
/// counter.
pub struct Sampler<E, P>
where
    E: Env,
    P: StepProcessor<E>,
{
    /// The environment being sampled from.
    env: E,

    /// Previous observation of the environment.
    prev_obs: Option<E::Obs>,

    /// Processor converting steps into transitions.
    step_processor: P,

    /// Return of the running episode.
    episode_return: f32,

    /// Length of the running episode in steps.
    episode_len: usize,

    /// Environment steps since the last counter reset.
    n_steps_for_fps: usize,

    /// Timer for the steps-per-second counter.
    timer_for_fps: SystemTime,
}

impl<E, P> Sampler<E, P>
where
    E: Env,
    P: StepProcessor<E>,
{
    /// Creates a sampler for the given environment and step processor.
    pub fn new(env: E, step_processor: P) -> Self {
        Self {
            env,
            prev_obs: None,
            step_processor,
            episode_return: 0.,
            episode_len: 0,
            n_steps_for_fps: 0,
            timer_for_fps: SystemTime::now(),
        }
    }

    /// Samples an experience and pushes it into the replay buffer.
    ///
    /// The sampled experience is the quadruple `(o_t, a_t, o_t+1, r_t)`
    /// together with the episode-end flag. When an episode ends, the
    /// environment is reset and the record carries the episode return and
    /// length.
    pub fn sample_and_push<P2, R>(&mut self, policy: &mut P2, buffer: &mut R) -> Result<Record>
    where
        P2: Policy<E>,
        R: ExperienceBufferBase<Item = P::Output>,
    {
        // Reset the environment at the beginning of a run
        if self.prev_obs.is_none() {
            self.prev_obs = Some(self.env.reset(None)?);
            self.step_processor
                .reset(self.prev_obs.as_ref().unwrap().clone());
        }

        // Sample an action and apply it to the environment
        let (step, mut record, is_done) = {
            let act = policy.sample(self.prev_obs.as_ref().unwrap());
            let (step, record) = self.env.step_with_reset(&act);
            let is_done = step.is_done();
            (step, record, is_done)
        };

        self.episode_return += step.reward[0];
        self.episode_len += 1;
        self.n_steps_for_fps += 1;

        // Update the previous observation
        self.prev_obs = match is_done {
            true => Some(step.init_obs.clone().expect("Failed to unwrap init_obs")),
            false => Some(step.obs.clone()),
        };

        // Produce and push the transition
        let transition = self.step_processor.process(step);
        buffer.push(transition)?;

        if is_done {
            record.insert("episode_return", RecordValue::Scalar(self.episode_return));
            record.insert("episode_len", RecordValue::Scalar(self.episode_len as f32));
            self.episode_return = 0.;
            self.episode_len = 0;
            self.step_processor
                .reset(self.prev_obs.as_ref().unwrap().clone());
        }

        Ok(record)
    }

    /// Returns environment steps per second since the last counter reset.
    pub fn fps(&self) -> f32 {
        match self.timer_for_fps.elapsed() {
            Ok(elapsed) => 1000. * self.n_steps_for_fps as f32 / (elapsed.as_millis() as f32),
            Err(_) => 0.,
        }
    }

    /// Resets the steps-per-second counter.
    pub fn reset_fps_counter(&mut self) {
        self.n_steps_for_fps = 0;
        self.timer_for_fps = SystemTime::now();
    }
}
