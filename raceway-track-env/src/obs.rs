//! Observation type of the driving environment.
use candle_core::Tensor;
use ndarray::{ArrayD, IxDyn};
use raceway_candle_agent::{util::arrayd_to_tensor, TensorBatch};

/// Fixed-length feature vector fed to the action-value estimator.
///
/// The layout is one normalized ray distance per ray angle, followed by
/// the normalized velocity, the goal-visibility flag and the normalized
/// heading. The array carries a leading batch dimension of 1.
#[derive(Clone, Debug)]
pub struct TrackObs(pub ArrayD<f32>);

impl TrackObs {
    /// Wraps a feature vector, adding the batch dimension.
    pub fn from_features(features: Vec<f32>) -> Self {
        let dim = features.len();
        Self(ArrayD::from_shape_vec(IxDyn(&[1, dim]), features).unwrap())
    }
}

impl raceway_core::Obs for TrackObs {
    fn dummy(n: usize) -> Self {
        Self(ArrayD::zeros(IxDyn(&[n, 0])))
    }

    fn len(&self) -> usize {
        self.0.shape()[0]
    }
}

impl From<TrackObs> for Tensor {
    fn from(obs: TrackObs) -> Tensor {
        arrayd_to_tensor::<_, f32>(obs.0, false).unwrap()
    }
}

impl From<TrackObs> for TensorBatch {
    fn from(obs: TrackObs) -> Self {
        TensorBatch::from_tensor(obs.into())
    }
}
