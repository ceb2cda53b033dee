//! Action type of the driving environment.
use crate::action::DriveAction;
use candle_core::{Device, Tensor};
use raceway_candle_agent::TensorBatch;

/// Discrete action wrapper around [`DriveAction`].
#[derive(Clone, Debug)]
pub struct TrackAct(pub DriveAction);

impl raceway_core::Act for TrackAct {
    fn len(&self) -> usize {
        1
    }
}

impl From<Tensor> for TrackAct {
    /// Converts an action-index tensor, as produced by the explorer, into
    /// a driving action.
    fn from(t: Tensor) -> Self {
        let ix = t.flatten_all().unwrap().to_vec1::<i64>().unwrap()[0] as usize;
        TrackAct(DriveAction::from_index(ix).expect("action index out of range"))
    }
}

impl From<TrackAct> for Tensor {
    fn from(act: TrackAct) -> Tensor {
        Tensor::from_slice(&[act.0.index() as i64], (1, 1), &Device::Cpu).unwrap()
    }
}

impl From<TrackAct> for TensorBatch {
    fn from(act: TrackAct) -> Self {
        TensorBatch::from_tensor(act.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tensor_roundtrip() {
        for action in DriveAction::ALL.iter() {
            let act = TrackAct(*action);
            let t: Tensor = act.into();
            let act_ = TrackAct::from(t);
            assert_eq!(act_.0, *action);
        }
    }
}
