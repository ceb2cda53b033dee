//! The driving environment.
use crate::{
    act::TrackAct, car::Car, config::TrackEnvConfig, obs::TrackObs, perception, track::TrackMap,
};
use anyhow::Result;
use log::trace;
use raceway_core::{record::Record, Env, Info, Step};

/// Information given at every step of the interaction with the environment.
///
/// Currently empty; present to match the type signature of [`Step`].
pub struct TrackInfo {}

impl Info for TrackInfo {}

/// A car on a ring circuit, observed through raycasts.
///
/// One step applies the discrete action to the car kinematics, recomputes
/// the derived center, casts the angular ray pattern and checks the car
/// footprint against the border mask. Episodes end on collision (crash
/// penalty), on reaching the finish strip (goal reward) or at the step
/// cutoff; a single done flag covers all three.
pub struct TrackEnv {
    config: TrackEnvConfig,
    track: TrackMap,
    car: Car,
    count_steps: usize,
}

impl TrackEnv {
    /// Builds the observation vector from the current car pose.
    fn observe(&self) -> TrackObs {
        let scan = perception::scan(
            &self.track,
            self.car.center,
            self.car.heading,
            &self.config.ray_angles,
            self.config.ray_length,
        );

        let mut features = scan.distances;
        features.push(self.car.vel / self.car.max_boost_vel());
        features.push(scan.goal_visible as i32 as f32);
        features.push(self.car.heading.rem_euclid(360.) / 360.);

        TrackObs::from_features(features)
    }

    /// Returns `true` if the car footprint touches a border cell.
    fn collided(&self) -> bool {
        let (cx, cy) = self.car.center;
        let r = self.car.half_width();
        let corners = [
            (cx - r, cy - r),
            (cx + r, cy - r),
            (cx - r, cy + r),
            (cx + r, cy + r),
            (cx, cy),
        ];
        corners
            .iter()
            .any(|(x, y)| self.track.is_wall(x.floor() as i32, y.floor() as i32))
    }

    /// Returns `true` if the car center is on the finish strip.
    fn reached_finish(&self) -> bool {
        let (cx, cy) = self.car.center;
        self.track.is_finish(cx.floor() as i32, cy.floor() as i32)
    }

    fn reset_(&mut self) -> TrackObs {
        let start = start_pose(&self.track, &self.config);
        self.car.reset(start, self.track.start_heading());
        self.count_steps = 0;
        self.observe()
    }
}

/// Top-left pose placing the car center on the track's start position.
fn start_pose(track: &TrackMap, config: &TrackEnvConfig) -> (f32, f32) {
    let (sx, sy) = track.start();
    (sx - config.car_half_width, sy - config.car_half_width)
}

impl Env for TrackEnv {
    type Config = TrackEnvConfig;
    type Obs = TrackObs;
    type Act = TrackAct;
    type Info = TrackInfo;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        let track = TrackMap::ring_circuit(
            config.track_width,
            config.track_height,
            config.corridor,
        );
        let car = Car::new(
            start_pose(&track, config),
            track.start_heading(),
            config.max_vel,
            config.rotation_vel,
            config.acceleration,
            config.car_half_width,
        );

        Ok(Self {
            config: config.clone(),
            track,
            car,
            count_steps: 0,
        })
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        trace!("TrackEnv::step(): {:?}", a);

        self.car.apply(a.0);
        self.count_steps += 1;

        let mut reward = self.car.vel.max(0.) * self.config.speed_reward
            - self.config.time_penalty;
        let mut is_done = 0i8;

        if self.collided() {
            reward -= self.config.crash_penalty;
            self.car.bounce();
            is_done = 1;
        } else if self.reached_finish() {
            reward += self.config.goal_reward;
            is_done = 1;
        }

        // The step cutoff shares the single done flag with collisions and
        // finishes.
        if self.count_steps >= self.config.max_steps {
            is_done = 1;
        }

        let obs = self.observe();
        let step = Step::new(obs, a.clone(), vec![reward], vec![is_done], TrackInfo {}, None);

        (step, Record::empty())
    }

    fn reset(&mut self, is_done: Option<&Vec<i8>>) -> Result<Self::Obs> {
        let reset = match is_done {
            None => true,
            Some(v) => {
                debug_assert_eq!(v.len(), 1);
                v[0] != 0
            }
        };

        match reset {
            true => Ok(self.reset_()),
            false => Ok(<Self::Obs as raceway_core::Obs>::dummy(1)),
        }
    }

    fn step_with_reset(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        let (step, record) = self.step(a);
        let step = if step.is_done() {
            let init_obs = self.reset_();
            Step {
                init_obs: Some(init_obs),
                ..step
            }
        } else {
            step
        };

        (step, record)
    }

    /// Resets the environment. The circuit is deterministic, so the index
    /// is unused.
    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        Ok(self.reset_())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::DriveAction;
    use raceway_core::Obs;

    fn tiny_config() -> TrackEnvConfig {
        TrackEnvConfig::default()
            .track_size(60, 40, 8)
            .car_half_width(1.5)
            .ray_length(50)
            .max_steps(50)
    }

    #[test]
    fn observation_has_declared_dimension() {
        let config = tiny_config();
        let mut env = TrackEnv::build(&config, 0).unwrap();
        let obs = env.reset(None).unwrap();

        assert_eq!(obs.len(), 1);
        assert_eq!(obs.0.shape(), &[1, config.obs_dim()]);
    }

    #[test]
    fn episode_ends_at_step_cutoff() {
        let config = tiny_config();
        let mut env = TrackEnv::build(&config, 0).unwrap();
        env.reset(None).unwrap();

        let mut done_at = None;
        for i in 0..config.max_steps + 1 {
            let (step, _) = env.step(&TrackAct(DriveAction::Sit));
            if step.is_done() {
                done_at = Some(i + 1);
                break;
            }
        }
        // Sitting in the corridor collides with nothing; only the cutoff
        // ends the episode.
        assert_eq!(done_at, Some(config.max_steps));
    }

    #[test]
    fn driving_into_the_wall_terminates_with_penalty() {
        let config = tiny_config();
        let mut env = TrackEnv::build(&config, 0).unwrap();
        env.reset(None).unwrap();

        let mut crashed = false;
        for _ in 0..200 {
            // Heading 270 from the start points along the corridor; keep
            // boosting and steering left to spiral into a wall.
            let (step, _) = env.step(&TrackAct(DriveAction::BoostLeft));
            if step.is_done() {
                assert!(step.reward[0] < -config.crash_penalty / 2.);
                crashed = true;
                break;
            }
        }
        assert!(crashed);
    }

    #[test]
    fn step_with_reset_carries_the_next_initial_observation() {
        let config = tiny_config().max_steps(3);
        let mut env = TrackEnv::build(&config, 0).unwrap();
        env.reset(None).unwrap();

        for _ in 0..2 {
            let (step, _) = env.step_with_reset(&TrackAct(DriveAction::Sit));
            assert!(step.init_obs.is_none());
        }
        let (step, _) = env.step_with_reset(&TrackAct(DriveAction::Sit));
        assert!(step.is_done());
        assert!(step.init_obs.is_some());
    }
}
