//! Exploration strategy of the DQN agent.
use candle_core::{shape::D, DType, Tensor};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer.
///
/// With probability `eps` a uniformly random action is taken, otherwise the
/// action with the highest value. `eps` is decremented by a fixed step once
/// per optimization step through [`decay`](Self::decay), never during
/// action selection, and is floored at `eps_final`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Current exploration rate.
    pub eps: f64,

    /// Floor of the exploration rate.
    pub eps_final: f64,

    /// Amount subtracted from `eps` at each decay.
    pub eps_step: f64,
}

#[allow(clippy::new_without_default)]
impl EpsilonGreedy {
    /// Constructs an epsilon-greedy explorer.
    pub fn new() -> Self {
        Self {
            eps: 1.0,
            eps_final: 0.002,
            eps_step: 0.00025,
        }
    }

    /// Takes an action based on action values, returns an i64 tensor.
    ///
    /// * `a` - action values of shape `[n_samples, n_actions]`.
    pub fn action(&self, a: &Tensor, rng: &mut impl Rng) -> Tensor {
        let r = rng.gen::<f64>();

        if r < self.eps {
            let n_samples = a.dims()[0];
            let n_actions = a.dims()[1] as u64;
            Tensor::from_slice(
                (0..n_samples)
                    .map(|_| (rng.gen::<u64>() % n_actions) as i64)
                    .collect::<Vec<_>>()
                    .as_slice(),
                &[n_samples],
                a.device(),
            )
            .unwrap()
        } else {
            self.greedy(a)
        }
    }

    /// Takes the highest-valued action, returns an i64 tensor.
    ///
    /// Ties are broken by the first index in enumeration order. This is a
    /// pure function of the action values.
    pub fn greedy(&self, a: &Tensor) -> Tensor {
        a.argmax(D::Minus1).unwrap().to_dtype(DType::I64).unwrap()
    }

    /// Decays the exploration rate by one step, flooring at `eps_final`.
    ///
    /// Called once per optimization step, so the exploration schedule is
    /// coupled to the number of learning updates rather than to episodes
    /// or action selections.
    pub fn decay(&mut self) {
        self.eps = (self.eps - self.eps_step).max(self.eps_final);
    }

    /// Sets the initial exploration rate.
    pub fn eps_start(self, v: f64) -> Self {
        let mut s = self;
        s.eps = v;
        s
    }

    /// Sets the floor of the exploration rate.
    pub fn eps_final(self, v: f64) -> Self {
        let mut s = self;
        s.eps_final = v;
        s
    }

    /// Sets the decay step of the exploration rate.
    pub fn eps_step(self, v: f64) -> Self {
        let mut s = self;
        s.eps_step = v;
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn decay_is_monotone_and_floored() {
        let mut explorer = EpsilonGreedy::new().eps_start(0.01).eps_final(0.002);

        let mut prev = explorer.eps;
        for _ in 0..100 {
            explorer.decay();
            assert!(explorer.eps <= prev);
            assert!(explorer.eps >= explorer.eps_final);
            prev = explorer.eps;
        }
        assert_eq!(explorer.eps, 0.002);
    }

    #[test]
    fn greedy_is_deterministic() {
        let explorer = EpsilonGreedy::new();
        let q = Tensor::from_slice(&[0.1f32, -0.4, 2.5, 0.9], (1, 4), &Device::Cpu).unwrap();

        let a0 = explorer.greedy(&q).to_vec1::<i64>().unwrap();
        for _ in 0..10 {
            let a = explorer.greedy(&q).to_vec1::<i64>().unwrap();
            assert_eq!(a, a0);
        }
        assert_eq!(a0, vec![2]);
    }
}
