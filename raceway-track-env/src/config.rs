//! Configuration of the driving environment.
use crate::action::DriveAction;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TrackEnv`](crate::TrackEnv).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TrackEnvConfig {
    /// Width of the track grid in cells.
    pub track_width: usize,

    /// Height of the track grid in cells.
    pub track_height: usize,

    /// Corridor width of the generated ring circuit, in cells.
    pub corridor: usize,

    /// Ray angles in degrees, relative to the car heading.
    pub ray_angles: Vec<f32>,

    /// Maximum ray length in cells.
    pub ray_length: usize,

    /// Maximum forward velocity of the car, in cells per step.
    pub max_vel: f32,

    /// Rotation per steering step, in degrees.
    pub rotation_vel: f32,

    /// Acceleration per throttle step, in cells per step squared.
    pub acceleration: f32,

    /// Half the side length of the car footprint, in cells.
    pub car_half_width: f32,

    /// Episode length cutoff in steps.
    pub max_steps: usize,

    /// Reward per unit of forward velocity per step.
    pub speed_reward: f32,

    /// Penalty subtracted at every step.
    pub time_penalty: f32,

    /// Penalty for colliding with the track border.
    pub crash_penalty: f32,

    /// Reward for crossing the finish strip.
    pub goal_reward: f32,
}

impl Default for TrackEnvConfig {
    fn default() -> Self {
        Self {
            track_width: 240,
            track_height: 160,
            corridor: 28,
            ray_angles: vec![
                0., 30., 45., 60., 75., 90., 105., 120., 135., 150., 180., 270.,
            ],
            ray_length: 120,
            max_vel: 6.,
            rotation_vel: 4.,
            acceleration: 0.4,
            car_half_width: 4.,
            max_steps: 1000,
            speed_reward: 0.05,
            time_penalty: 0.1,
            crash_penalty: 100.,
            goal_reward: 100.,
        }
    }
}

impl TrackEnvConfig {
    /// Length of the observation vector: one distance per ray angle plus
    /// velocity, goal visibility and heading.
    pub fn obs_dim(&self) -> usize {
        self.ray_angles.len() + 3
    }

    /// Number of discrete actions.
    pub fn n_actions(&self) -> usize {
        DriveAction::ALL.len()
    }

    /// Sets the dimensions of the generated ring circuit.
    pub fn track_size(mut self, width: usize, height: usize, corridor: usize) -> Self {
        self.track_width = width;
        self.track_height = height;
        self.corridor = corridor;
        self
    }

    /// Sets the ray angles.
    pub fn ray_angles(mut self, v: Vec<f32>) -> Self {
        self.ray_angles = v;
        self
    }

    /// Sets the maximum ray length.
    pub fn ray_length(mut self, v: usize) -> Self {
        self.ray_length = v;
        self
    }

    /// Sets half the side length of the car footprint.
    pub fn car_half_width(mut self, v: f32) -> Self {
        self.car_half_width = v;
        self
    }

    /// Sets the episode length cutoff.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Constructs [`TrackEnvConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrackEnvConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn obs_dim_counts_rays_and_scalars() {
        let config = TrackEnvConfig::default();
        assert_eq!(config.obs_dim(), 15);
        assert_eq!(config.n_actions(), 12);
    }

    #[test]
    fn config_roundtrips_through_yaml() -> Result<()> {
        let config = TrackEnvConfig::default()
            .track_size(60, 40, 8)
            .ray_length(50)
            .max_steps(200);

        let dir = TempDir::new("track_env_config")?;
        let path = dir.path().join("env.yaml");
        config.save(&path)?;
        let config_ = TrackEnvConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
