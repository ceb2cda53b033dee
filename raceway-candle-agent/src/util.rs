//! Utilities.
use anyhow::Result;
use candle_core::{DType, Device, Tensor, WithDType};
use ndarray::ArrayD;
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Critic loss type.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Smooth L1 loss.
    SmoothL1,
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> i64;

    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: i64);
}

/// See <https://pytorch.org/docs/stable/generated/torch.nn.SmoothL1Loss.html>.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor, candle_core::Error> {
    let device = x.device();
    let d = (x - y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?.to_device(&device)?;
    let m2 = Tensor::try_from(1f32)?
        .to_device(&device)?
        .broadcast_sub(&m1)?;
    (((0.5 * m1)? * d.powf(2.0)?)? + (m2 * (d - 0.5)?)?)?.mean_all()
}

/// Returns the discount vector masking terminal transitions.
///
/// Element `i` is `gamma` when transition `i` continues and `0.0` when it
/// ends an episode, so `reward + gamma_not_done * q_next_max` bootstraps
/// zero future value from terminal states. The mask is applied regardless
/// of the network output, since the network has no notion of episode
/// boundaries.
pub fn gamma_not_done(gamma: f32, is_done: &[i8], device: &Device) -> Result<Tensor> {
    let batch_size = is_done.len();
    let not_done = is_done
        .iter()
        .map(|d| (1 - *d) as f32 * gamma)
        .collect::<Vec<_>>();
    Ok(Tensor::from_slice(&not_done[..], (batch_size,), device)?)
}

/// Converts a vector into a 1-D tensor, optionally adding a batch dimension.
pub fn vec_to_tensor<T1, T2>(v: Vec<T1>, add_batch_dim: bool) -> Result<Tensor>
where
    T1: AsPrimitive<T2>,
    T2: WithDType,
{
    let v = v.iter().map(|e| e.as_()).collect::<Vec<_>>();
    let t: Tensor = TryFrom::<Vec<T2>>::try_from(v)?;

    match add_batch_dim {
        true => Ok(t.unsqueeze(0)?),
        false => Ok(t),
    }
}

/// Converts an ndarray into a tensor, optionally adding a batch dimension.
pub fn arrayd_to_tensor<T1, T2>(a: ArrayD<T1>, add_batch_dim: bool) -> Result<Tensor>
where
    T1: AsPrimitive<T2>,
    T2: WithDType,
{
    let shape = a.shape();
    let v = a.iter().map(|e| e.as_()).collect::<Vec<_>>();
    let t: Tensor = TryFrom::<Vec<T2>>::try_from(v)?;
    let t = t.reshape(shape)?;

    match add_batch_dim {
        true => Ok(t.unsqueeze(0)?),
        false => Ok(t),
    }
}

/// Converts a tensor into an ndarray, optionally dropping a batch dimension.
pub fn tensor_to_arrayd<T>(t: Tensor, delete_batch_dim: bool) -> Result<ArrayD<T>>
where
    T: WithDType,
{
    let shape = match delete_batch_dim {
        false => t.dims()[..].iter().map(|x| *x as usize).collect::<Vec<_>>(),
        true => t.dims()[1..]
            .iter()
            .map(|x| *x as usize)
            .collect::<Vec<_>>(),
    };
    let v: Vec<T> = t.flatten_all()?.to_vec1()?;

    Ok(ndarray::Array1::<T>::from(v).into_shape(ndarray::IxDyn(&shape))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_not_done_masks_terminal_transitions() -> Result<()> {
        let device = Device::Cpu;
        let gamma = 0.9f32;
        let is_done = vec![0i8, 1, 0, 1];

        let mask = gamma_not_done(gamma, &is_done, &device)?;
        assert_eq!(mask.to_vec1::<f32>()?, vec![0.9, 0.0, 0.9, 0.0]);

        // For an all-terminal batch the bootstrapped term vanishes and the
        // target equals the reward exactly, whatever the network outputs.
        let is_done = vec![1i8; 3];
        let reward = Tensor::from_slice(&[1.0f32, -2.0, 0.5], (3,), &device)?;
        let q_next_max = Tensor::from_slice(&[10.0f32, 20.0, -30.0], (3,), &device)?;
        let mask = gamma_not_done(gamma, &is_done, &device)?;
        let tgt = (&reward + (mask * q_next_max)?)?;
        assert_eq!(tgt.to_vec1::<f32>()?, reward.to_vec1::<f32>()?);
        Ok(())
    }

    #[test]
    fn smooth_l1_matches_quadratic_region() -> Result<()> {
        let device = Device::Cpu;
        let x = Tensor::from_slice(&[0.0f32, 1.0], (2,), &device)?;
        let y = Tensor::from_slice(&[0.5f32, 1.0], (2,), &device)?;

        // |d| < 1 everywhere, so the loss is 0.5 * d^2 averaged.
        let loss = smooth_l1_loss(&x, &y)?.to_scalar::<f32>()?;
        assert!((loss - 0.0625).abs() < 1e-6);
        Ok(())
    }
}
