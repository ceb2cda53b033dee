//! Raycast perception.
use crate::track::TrackMap;

/// Result of casting the angular ray pattern from the car center.
#[derive(Clone, Debug)]
pub struct RayScan {
    /// One distance per ray, normalized by the ray length to `[0, 1]`.
    /// A ray that hits nothing reports the full length.
    pub distances: Vec<f32>,

    /// `true` if at least one ray landed on the finish strip.
    pub goal_visible: bool,
}

/// Casts rays from `center` at the given angles relative to `heading`.
///
/// Each ray marches cell by cell up to `ray_length` cells and stops at the
/// first border cell or finish-strip cell; leaving the grid ends the ray
/// without a hit, like marching past the window edge would.
pub fn scan(
    track: &TrackMap,
    center: (f32, f32),
    heading: f32,
    angles: &[f32],
    ray_length: usize,
) -> RayScan {
    let mut distances = Vec::with_capacity(angles.len());
    let mut goal_visible = false;

    for a in angles.iter() {
        let angle = (a + heading).rem_euclid(360.);
        let rad = -angle.to_radians();
        let (sin, cos) = (rad.sin(), rad.cos());
        let mut dist = ray_length as f32;

        for i in 0..ray_length {
            let px = (center.0 + cos * i as f32).floor() as i32;
            let py = (center.1 + sin * i as f32).floor() as i32;

            if px < 0 || py < 0 || px >= track.width() as i32 || py >= track.height() as i32 {
                break;
            }

            if track.is_finish(px, py) {
                dist = distance(center, (px, py));
                goal_visible = true;
                break;
            }

            if track.is_wall(px, py) {
                dist = distance(center, (px, py));
                break;
            }
        }

        distances.push((dist / ray_length as f32).min(1.));
    }

    RayScan {
        distances,
        goal_visible,
    }
}

fn distance(from: (f32, f32), to: (i32, i32)) -> f32 {
    let dx = to.0 as f32 - from.0;
    let dy = to.1 as f32 - from.1;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_are_normalized() {
        let track = TrackMap::ring_circuit(60, 40, 8);
        let scan = scan(&track, track.start(), 0., &[0., 90., 180., 270.], 100);

        assert_eq!(scan.distances.len(), 4);
        for d in scan.distances.iter() {
            assert!(*d > 0. && *d <= 1.);
        }
    }

    #[test]
    fn closer_walls_give_smaller_distances() {
        let track = TrackMap::ring_circuit(60, 40, 8);
        let (sx, sy) = track.start();

        // With heading 0, ray angle 270 points down the grid and angle 0
        // points right. The bottom wall is a handful of cells below the
        // start; the outer wall to the right is much farther.
        let below = scan(&track, (sx, sy), 0., &[270.], 100).distances[0];
        let right = scan(&track, (sx, sy), 0., &[0.], 100).distances[0];
        assert!(below < right);
    }

    #[test]
    fn finish_strip_is_seen_along_the_corridor() {
        let track = TrackMap::ring_circuit(60, 40, 8);
        // Looking left (ray angle 180) along the bottom corridor from the
        // start reaches the finish strip before any wall.
        let scan = scan(&track, track.start(), 0., &[180.], 100);
        assert!(scan.goal_visible);
    }

    #[test]
    fn blocked_ray_reports_the_wall_not_the_goal() {
        let track = TrackMap::ring_circuit(60, 40, 8);
        // Looking up (ray angle 90) from the start hits the inner block;
        // no goal there.
        let scan = scan(&track, track.start(), 0., &[90.], 100);
        assert!(!scan.goal_visible);
        assert!(scan.distances[0] < 1.);
    }
}
