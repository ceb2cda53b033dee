//! Generic batch of transitions.
use crate::TransitionBatch;

/// Slot storage for observations or actions in a replay buffer.
///
/// Implementors own `capacity` slots indexed by the buffer's write cursor
/// and gather sampled slots into a new batch.
pub trait BatchBase {
    /// Creates a new storage with the given number of slots.
    fn new(capacity: usize) -> Self;

    /// Writes `data` starting at slot `ix`, wrapping around at the end of
    /// the storage.
    fn push(&mut self, ix: usize, data: Self);

    /// Gathers the slots at the given indices into a new batch.
    fn sample(&self, ixs: &Vec<usize>) -> Self;
}

/// A generic batch of transitions `(o_t, a_t, o_t+1, r_t, done_t)`.
///
/// The five parallel components keep their correspondence: element `i` of
/// each field belongs to the same transition.
pub struct ReplayBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Observations.
    pub obs: O,

    /// Actions taken at the observations.
    pub act: A,

    /// Observations at the next step.
    pub next_obs: O,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Episode-end flags.
    pub is_done: Vec<i8>,
}

impl<O, A> TransitionBatch for ReplayBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type ObsBatch = O;
    type ActBatch = A;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
    ) {
        (self.obs, self.act, self.next_obs, self.reward, self.is_done)
    }

    fn len(&self) -> usize {
        self.reward.len()
    }

    fn obs(&self) -> &Self::ObsBatch {
        &self.obs
    }

    fn act(&self) -> &Self::ActBatch {
        &self.act
    }
}

impl<O, A> ReplayBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Creates an empty batch with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: Vec::with_capacity(capacity),
            is_done: Vec::with_capacity(capacity),
        }
    }
}
