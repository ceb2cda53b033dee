//! A raycast driving simulation.
//!
//! The environment drives a kinematic car around a track stored as an
//! occupancy grid. The car perceives the track through a fixed angular
//! raycast pattern and is controlled by one of twelve discrete actions
//! combining throttle and steering. Collisions with the track border end
//! the episode with a penalty; crossing the finish strip ends it with a
//! reward.
mod act;
mod action;
mod car;
mod config;
mod env;
mod obs;
mod perception;
mod track;

pub use act::TrackAct;
pub use action::{DriveAction, Steering, Throttle};
pub use car::Car;
pub use config::TrackEnvConfig;
pub use env::{TrackEnv, TrackInfo};
pub use obs::TrackObs;
pub use perception::{scan, RayScan};
pub use track::{FinishLine, TrackMap};
