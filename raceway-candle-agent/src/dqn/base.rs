//! DQN agent implemented with candle.
use super::{config::DqnConfig, explorer::EpsilonGreedy, model::DqnModel};
use crate::{
    model::SubModel1,
    util::{gamma_not_done, smooth_l1_loss, CriticLoss, OutDim},
};
use anyhow::Result;
use candle_core::{shape::D, Device, Tensor};
use candle_nn::loss::mse;
use log::warn;
use raceway_core::{
    error::CoreError,
    record::{Record, RecordValue},
    Agent, Env, ExperienceBufferBase, Policy, ReplayBufferBase, TransitionBatch,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, marker::PhantomData, path::Path};

/// DQN agent for a discrete action set.
///
/// The agent owns the replayed estimator parameters (through [`DqnModel`])
/// and the exploration state. One optimization step samples a batch of
/// distinct transitions from the replay buffer, computes a one-step
/// bootstrapped target from the estimator's own output on the next
/// observations (masked to zero on terminal transitions), and applies one
/// gradient step on the prediction error for the actions actually taken.
///
/// The exploration rate decays by a fixed step once per optimization step.
pub struct Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input>,
    E::Act: From<Q::Output>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    pub(in crate::dqn) n_updates_per_opt: usize,
    pub(in crate::dqn) min_transitions_warmup: usize,
    pub(in crate::dqn) batch_size: usize,
    pub(in crate::dqn) qnet: DqnModel<Q>,
    pub(in crate::dqn) train: bool,
    pub(in crate::dqn) discount_factor: f64,
    pub(in crate::dqn) explorer: EpsilonGreedy,
    pub(in crate::dqn) device: Device,
    pub(in crate::dqn) n_opts: usize,
    pub(in crate::dqn) critic_loss: CriticLoss,
    pub(in crate::dqn) phantom: PhantomData<(E, R)>,
    rng: SmallRng,
}

impl<E, Q, R> Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input>,
    E::Act: From<Q::Output>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    /// Returns the current exploration rate.
    pub fn exploration_rate(&self) -> f64 {
        self.explorer.eps
    }

    /// Returns the number of optimization steps taken so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// One gradient step on a sampled batch.
    ///
    /// Returns `None` when the buffer cannot produce a batch yet; this is
    /// the deferred learning start, not an error. A non-finite loss skips
    /// the parameter update so a diverging optimizer cannot corrupt the
    /// estimator.
    fn update_critic(&mut self, buffer: &mut R) -> Option<f32> {
        let batch = match buffer.batch(self.batch_size) {
            Ok(batch) => batch,
            Err(err) => {
                debug_assert!(matches!(
                    err.downcast_ref::<CoreError>(),
                    Some(CoreError::InsufficientData { .. })
                ));
                return None;
            }
        };

        let (obs, act, next_obs, reward, is_done) = batch.unpack();
        let obs = obs.into();
        let act = act.into().to_device(&self.device).unwrap();
        let next_obs = next_obs.into();
        let reward = Tensor::from_slice(&reward[..], (reward.len(),), &self.device).unwrap();
        let gamma_nd = gamma_not_done(self.discount_factor as f32, &is_done, &self.device).unwrap();

        // Value currently predicted for the action actually taken
        let pred = {
            let x = self.qnet.forward(&obs);
            x.gather(&act, D::Minus1)
                .unwrap()
                .squeeze(D::Minus1)
                .unwrap()
        };

        // One-step bootstrapped target; terminal transitions bootstrap zero
        let tgt = {
            let q_next_max = self.qnet.forward(&next_obs).max(D::Minus1).unwrap();
            (reward + (gamma_nd * q_next_max).unwrap()).unwrap()
        }
        .detach();

        let loss = match self.critic_loss {
            CriticLoss::Mse => mse(&pred, &tgt).unwrap(),
            CriticLoss::SmoothL1 => smooth_l1_loss(&pred, &tgt).unwrap(),
        };
        let loss_value = loss.to_scalar::<f32>().unwrap();

        if !loss_value.is_finite() {
            warn!(
                "diverged training: non-finite loss ({}), skipping the parameter update",
                loss_value
            );
            return Some(loss_value);
        }

        self.qnet.backward_step(&loss).unwrap();

        Some(loss_value)
    }

    fn opt_(&mut self, buffer: &mut R) -> Option<Record> {
        let mut loss_critic = 0f32;

        for _ in 0..self.n_updates_per_opt {
            loss_critic += self.update_critic(buffer)?;
        }

        loss_critic /= self.n_updates_per_opt as f32;

        self.explorer.decay();
        self.n_opts += 1;

        Some(Record::from_slice(&[
            ("loss_critic", RecordValue::Scalar(loss_critic)),
            ("eps", RecordValue::Scalar(self.explorer.eps as f32)),
        ]))
    }
}

impl<E, Q, R> Policy<E> for Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Output = Tensor>,
    R: ReplayBufferBase,
    E::Obs: Into<Q::Input>,
    E::Act: From<Q::Output>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    type Config = DqnConfig<Q>;

    /// Constructs the DQN agent.
    fn build(config: Self::Config) -> Self {
        let device: Device = config
            .device
            .expect("No device is given for the DQN agent")
            .into();
        let qnet = DqnModel::build(config.model_config, device.clone()).unwrap();

        Dqn {
            qnet,
            n_updates_per_opt: config.n_updates_per_opt,
            min_transitions_warmup: config.min_transitions_warmup,
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            train: config.train,
            explorer: config.explorer,
            device,
            n_opts: 0,
            critic_loss: config.critic_loss,
            phantom: PhantomData,
            rng: SmallRng::seed_from_u64(42),
        }
    }

    /// Samples an action.
    ///
    /// In training mode the explorer takes a random action with probability
    /// epsilon. In evaluation mode the action is the greedy one, so
    /// repeated calls with the same observation and unchanged parameters
    /// return the same action.
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let q = self.qnet.forward(&obs.clone().into());
        let a = if self.train {
            self.explorer.action(&q, &mut self.rng)
        } else {
            self.explorer.greedy(&q)
        };
        a.into()
    }
}

impl<E, Q, R> Agent<E, R> for Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Output = Tensor>,
    R: ReplayBufferBase + ExperienceBufferBase,
    E::Obs: Into<Q::Input>,
    E::Act: From<Q::Output>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::Input>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    /// Performs an optimization step.
    ///
    /// While the buffer holds fewer transitions than
    /// `max(batch_size, min_transitions_warmup)`, the step is a no-op:
    /// parameters stay untouched and the exploration rate is not decayed.
    fn opt(&mut self, buffer: &mut R) -> Option<Record> {
        if buffer.len() >= self.min_transitions_warmup.max(self.batch_size) {
            self.opt_(buffer)
        } else {
            None
        }
    }

    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        fs::create_dir_all(&path)?;
        self.qnet
            .save(path.as_ref().join("qnet.safetensors").as_path())?;
        fs::write(
            path.as_ref().join("eps.yaml"),
            serde_yaml::to_string(&self.explorer)?,
        )?;
        Ok(())
    }

    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.qnet
            .load(path.as_ref().join("qnet.safetensors").as_path())?;
        let eps_path = path.as_ref().join("eps.yaml");
        if eps_path.exists() {
            self.explorer = serde_yaml::from_str(&fs::read_to_string(eps_path)?)?;
        }
        Ok(())
    }
}
