//! Circular replay buffer with uniform sampling.
use super::{config::UniformReplayBufferConfig, BatchBase, ReplayBatch};
use crate::{error::CoreError, ExperienceBufferBase, ReplayBufferBase, TransitionBatch};
use anyhow::Result;
use rand::{rngs::StdRng, seq::index, SeedableRng};

/// A fixed-capacity circular replay buffer with uniform sampling.
///
/// Transitions are stored in five parallel stores (observations, actions,
/// next observations, rewards, episode-end flags) indexed by a write cursor
/// that wraps at `capacity`. Once the buffer is full, new transitions
/// silently overwrite the oldest ones.
///
/// [`ReplayBufferBase::batch`] draws **distinct** indices uniformly at
/// random from the live region of the buffer, so a batch never contains the
/// same transition twice.
///
/// # Type Parameters
///
/// * `O` - Observation storage, implements [`BatchBase`]
/// * `A` - Action storage, implements [`BatchBase`]
pub struct UniformReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Maximum number of transitions that can be stored.
    capacity: usize,

    /// Current insertion index.
    i: usize,

    /// Current number of live transitions, saturating at `capacity`.
    size: usize,

    /// Storage for observations.
    obs: O,

    /// Storage for actions.
    act: A,

    /// Storage for next observations.
    next_obs: O,

    /// Storage for rewards.
    reward: Vec<f32>,

    /// Storage for episode-end flags.
    is_done: Vec<i8>,

    /// Random number generator for sampling.
    rng: StdRng,
}

impl<O, A> UniformReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    #[inline]
    fn push_reward(&mut self, i: usize, b: &Vec<f32>) {
        let mut j = i;
        for r in b.iter() {
            self.reward[j] = *r;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    #[inline]
    fn push_is_done(&mut self, i: usize, b: &Vec<i8>) {
        let mut j = i;
        for d in b.iter() {
            self.is_done[j] = *d;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    fn sample_reward(&self, ixs: &Vec<usize>) -> Vec<f32> {
        ixs.iter().map(|ix| self.reward[*ix]).collect()
    }

    fn sample_is_done(&self, ixs: &Vec<usize>) -> Vec<i8> {
        ixs.iter().map(|ix| self.is_done[*ix]).collect()
    }

    /// Returns the number of episode-end flags among the live transitions.
    pub fn num_done_flags(&self) -> usize {
        self.is_done[..self.size]
            .iter()
            .map(|is_done| *is_done as usize)
            .sum()
    }

    /// Returns the sum of rewards of the live transitions.
    pub fn sum_rewards(&self) -> f32 {
        self.reward[..self.size].iter().sum()
    }
}

impl<O, A> ExperienceBufferBase for UniformReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Item = ReplayBatch<O, A>;

    /// Returns the current number of live transitions in the buffer.
    fn len(&self) -> usize {
        self.size
    }

    /// Adds the transitions in `tr` to the buffer.
    ///
    /// The write wraps around at the end of the buffer and silently
    /// overwrites the oldest transitions once the buffer is full.
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        let len = tr.len();
        let (obs, act, next_obs, reward, is_done) = tr.unpack();
        self.obs.push(self.i, obs);
        self.act.push(self.i, act);
        self.next_obs.push(self.i, next_obs);
        self.push_reward(self.i, &reward);
        self.push_is_done(self.i, &is_done);

        self.i = (self.i + len) % self.capacity;
        self.size += len;
        if self.size >= self.capacity {
            self.size = self.capacity;
        }

        Ok(())
    }
}

impl<O, A> ReplayBufferBase for UniformReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Config = UniformReplayBufferConfig;
    type Batch = ReplayBatch<O, A>;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity;

        Self {
            capacity,
            i: 0,
            size: 0,
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: vec![0.; capacity],
            is_done: vec![0; capacity],
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Samples a batch of `size` distinct transitions uniformly at random
    /// from the live region of the buffer.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::InsufficientData`] if fewer than `size`
    /// transitions are stored.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if size > self.size {
            return Err(CoreError::InsufficientData {
                len: self.size,
                requested: size,
            }
            .into());
        }

        let ixs = index::sample(&mut self.rng, self.size, size).into_vec();

        Ok(Self::Batch {
            obs: self.obs.sample(&ixs),
            act: self.act.sample(&ixs),
            next_obs: self.next_obs.sample(&ixs),
            reward: self.sample_reward(&ixs),
            is_done: self.sample_is_done(&ixs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One f32 value per slot, enough to observe the buffer mechanics.
    struct ScalarStore {
        buf: Vec<f32>,
    }

    impl BatchBase for ScalarStore {
        fn new(capacity: usize) -> Self {
            Self {
                buf: vec![0.; capacity],
            }
        }

        fn push(&mut self, ix: usize, data: Self) {
            let capacity = self.buf.len();
            let mut j = ix;
            for v in data.buf.iter() {
                self.buf[j] = *v;
                j += 1;
                if j == capacity {
                    j = 0;
                }
            }
        }

        fn sample(&self, ixs: &Vec<usize>) -> Self {
            Self {
                buf: ixs.iter().map(|ix| self.buf[*ix]).collect(),
            }
        }
    }

    fn transition(v: f32) -> ReplayBatch<ScalarStore, ScalarStore> {
        ReplayBatch {
            obs: ScalarStore { buf: vec![v] },
            act: ScalarStore { buf: vec![v] },
            next_obs: ScalarStore { buf: vec![v + 0.5] },
            reward: vec![v],
            is_done: vec![0],
        }
    }

    fn buffer(capacity: usize) -> UniformReplayBuffer<ScalarStore, ScalarStore> {
        let config = UniformReplayBufferConfig::default()
            .capacity(capacity)
            .seed(42);
        UniformReplayBuffer::build(&config)
    }

    #[test]
    fn wraparound_overwrites_oldest() {
        let mut buffer = buffer(5);
        for v in 0..7 {
            buffer.push(transition(v as f32)).unwrap();
        }

        assert_eq!(buffer.len(), 5);
        // Slots 0 and 1 were overwritten by the 6th and 7th transitions.
        assert_eq!(buffer.reward, vec![5., 6., 2., 3., 4.]);
        assert_eq!(buffer.i, 2);

        // Samples come only from live slots.
        let batch = buffer.batch(5).unwrap();
        let mut rewards = batch.reward;
        rewards.sort_by(|x, y| x.partial_cmp(y).unwrap());
        assert_eq!(rewards, vec![2., 3., 4., 5., 6.]);
    }

    #[test]
    fn sampled_indices_are_distinct() {
        let mut buffer = buffer(10);
        for v in 0..6 {
            buffer.push(transition(v as f32)).unwrap();
        }

        for _ in 0..10 {
            let batch = buffer.batch(6).unwrap();
            let mut rewards = batch.reward;
            rewards.sort_by(|x, y| x.partial_cmp(y).unwrap());
            // All stored values are distinct, so a duplicate index would
            // show up as a duplicate reward.
            assert_eq!(rewards, vec![0., 1., 2., 3., 4., 5.]);
        }
    }

    #[test]
    fn batch_fails_on_insufficient_data() {
        let mut buffer = buffer(10);
        for v in 0..3 {
            buffer.push(transition(v as f32)).unwrap();
        }

        let err = buffer.batch(4).err().unwrap();
        match err.downcast_ref::<CoreError>() {
            Some(CoreError::InsufficientData { len, requested }) => {
                assert_eq!(*len, 3);
                assert_eq!(*requested, 4);
            }
            _ => panic!("expected InsufficientData, got {:?}", err),
        }
    }

    #[test]
    fn parallel_components_stay_aligned() {
        let mut buffer = buffer(8);
        for v in 0..8 {
            buffer.push(transition(v as f32)).unwrap();
        }

        let batch = buffer.batch(4).unwrap();
        for i in 0..4 {
            assert_eq!(batch.obs.buf[i], batch.reward[i]);
            assert_eq!(batch.next_obs.buf[i], batch.reward[i] + 0.5);
        }
    }
}
