//! Car kinematics.
use crate::action::{DriveAction, Steering, Throttle};

/// Kinematic state of the car.
///
/// The pose is the top-left corner `(x, y)` plus a heading in degrees;
/// `center` is derived from the pose and recomputed explicitly at the end
/// of every mutation, so readers never observe a stale value.
#[derive(Clone, Debug)]
pub struct Car {
    /// Horizontal position of the top-left corner, in grid cells.
    pub x: f32,

    /// Vertical position of the top-left corner, in grid cells.
    pub y: f32,

    /// Heading in degrees. Zero points up the grid; positive turns
    /// counterclockwise.
    pub heading: f32,

    /// Signed velocity in cells per step. Negative while reversing.
    pub vel: f32,

    /// Center of the car, derived from the pose.
    pub center: (f32, f32),

    acceleration: f32,
    max_vel: f32,
    max_boost_vel: f32,
    rotation_vel: f32,
    half_width: f32,
}

impl Car {
    /// Creates a car at the given start pose, standing still.
    pub fn new(
        start: (f32, f32),
        heading: f32,
        max_vel: f32,
        rotation_vel: f32,
        acceleration: f32,
        half_width: f32,
    ) -> Self {
        let mut car = Self {
            x: start.0,
            y: start.1,
            heading,
            vel: 0.,
            center: (0., 0.),
            acceleration,
            max_vel,
            max_boost_vel: 1.5 * max_vel,
            rotation_vel,
            half_width,
        };
        car.update_center();
        car
    }

    /// Applies one discrete action: steering, then throttle, then one step
    /// of motion.
    pub fn apply(&mut self, action: DriveAction) {
        match action.steering() {
            Steering::Left => self.heading += self.rotation_vel,
            Steering::Right => self.heading -= self.rotation_vel,
            Steering::Straight => {}
        }

        match action.throttle() {
            Throttle::Accelerate => {
                self.vel = (self.vel + self.acceleration).min(self.max_vel);
            }
            Throttle::Reverse => {
                self.vel = (self.vel - self.acceleration).max(-self.max_vel / 2.);
            }
            Throttle::Boost => {
                self.vel = (self.vel + 3. * self.acceleration).min(self.max_boost_vel);
            }
            Throttle::Idle => self.coast(),
        }

        self.advance();
        self.update_center();
    }

    /// Bleeds off speed toward zero, from either direction.
    fn coast(&mut self) {
        if self.vel >= 0. {
            self.vel = (self.vel - self.acceleration / 2.).max(0.);
        } else {
            self.vel = (self.vel + self.acceleration / 2.).min(0.);
        }
    }

    /// Moves one step along the heading.
    fn advance(&mut self) {
        let radians = self.heading.to_radians();
        self.x -= radians.sin() * self.vel;
        self.y -= radians.cos() * self.vel;
    }

    /// Reverses the velocity with a loss, as when hitting a wall.
    pub fn bounce(&mut self) {
        self.vel = -self.vel * 0.6;
        self.advance();
        self.update_center();
    }

    /// Puts the car back to the given start pose, standing still.
    pub fn reset(&mut self, start: (f32, f32), heading: f32) {
        self.x = start.0;
        self.y = start.1;
        self.heading = heading;
        self.vel = 0.;
        self.update_center();
    }

    fn update_center(&mut self) {
        self.center = (self.x + self.half_width, self.y + self.half_width);
    }

    /// Returns half the side length of the car footprint.
    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    /// Returns the maximum velocity reachable with boost.
    pub fn max_boost_vel(&self) -> f32 {
        self.max_boost_vel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car() -> Car {
        Car::new((10., 10.), 0., 6., 4., 0.4, 2.)
    }

    #[test]
    fn forward_velocity_saturates_at_max() {
        let mut car = car();
        for _ in 0..100 {
            car.apply(DriveAction::Forward);
        }
        assert_eq!(car.vel, 6.);
    }

    #[test]
    fn reverse_is_capped_at_half_speed() {
        let mut car = car();
        for _ in 0..100 {
            car.apply(DriveAction::Backward);
        }
        assert_eq!(car.vel, -3.);
    }

    #[test]
    fn boost_exceeds_max_vel_up_to_boost_cap() {
        let mut car = car();
        for _ in 0..100 {
            car.apply(DriveAction::Boost);
        }
        assert_eq!(car.vel, 9.);
    }

    #[test]
    fn coasting_stops_the_car() {
        let mut car = car();
        for _ in 0..3 {
            car.apply(DriveAction::Forward);
        }
        assert!(car.vel > 0.);
        for _ in 0..100 {
            car.apply(DriveAction::Sit);
        }
        assert_eq!(car.vel, 0.);
    }

    #[test]
    fn heading_zero_moves_up() {
        let mut car = car();
        let y0 = car.y;
        let x0 = car.x;
        car.apply(DriveAction::Forward);
        assert!(car.y < y0);
        assert_eq!(car.x, x0);
    }

    #[test]
    fn center_tracks_pose() {
        let mut car = car();
        car.apply(DriveAction::ForwardLeft);
        assert_eq!(car.center, (car.x + 2., car.y + 2.));
        car.bounce();
        assert_eq!(car.center, (car.x + 2., car.y + 2.));
    }

    #[test]
    fn bounce_reverses_with_loss() {
        let mut car = car();
        for _ in 0..100 {
            car.apply(DriveAction::Forward);
        }
        car.bounce();
        assert!((car.vel + 3.6).abs() < 1e-6);
    }
}
