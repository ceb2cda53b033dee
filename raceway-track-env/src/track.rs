//! Track geometry and collision mask.
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Axis-aligned finish strip on the track.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct FinishLine {
    /// Left edge, in grid cells.
    pub x: usize,

    /// Top edge, in grid cells.
    pub y: usize,

    /// Width in grid cells.
    pub w: usize,

    /// Height in grid cells.
    pub h: usize,
}

impl FinishLine {
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x as i32
            && x < (self.x + self.w) as i32
            && y >= self.y as i32
            && y < (self.y + self.h) as i32
    }
}

/// Occupancy grid of the track border plus start and finish metadata.
///
/// A cell value of 1 marks a border cell; positions outside the grid count
/// as border as well, so rays and collision checks need no special casing
/// at the edges.
#[derive(Clone, Debug)]
pub struct TrackMap {
    width: usize,
    height: usize,
    walls: Vec<u8>,
    start: (f32, f32),
    start_heading: f32,
    finish: FinishLine,
}

impl TrackMap {
    /// Creates a track from a row-major border mask.
    pub fn new(
        width: usize,
        height: usize,
        walls: Vec<u8>,
        start: (f32, f32),
        start_heading: f32,
        finish: FinishLine,
    ) -> Result<Self> {
        ensure!(
            walls.len() == width * height,
            "border mask has {} cells, expected {}",
            walls.len(),
            width * height
        );

        Ok(Self {
            width,
            height,
            walls,
            start,
            start_heading,
            finish,
        })
    }

    /// Builds a rectangular ring circuit.
    ///
    /// The drivable area is a ring of the given corridor width between the
    /// outer boundary and a solid inner block. The start is at the middle
    /// of the bottom corridor, heading along the corridor; the finish
    /// strip spans the bottom corridor a quarter of the track to the left
    /// of the start.
    pub fn ring_circuit(width: usize, height: usize, corridor: usize) -> Self {
        assert!(width > 2 * corridor + 4 && height > 2 * corridor + 4);

        let mut walls = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                let on_boundary = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                let in_block = x > corridor
                    && x < width - 1 - corridor
                    && y > corridor
                    && y < height - 1 - corridor;
                if on_boundary || in_block {
                    walls[y * width + x] = 1;
                }
            }
        }

        let start = (width as f32 / 2., height as f32 - 1. - corridor as f32 / 2.);
        let finish = FinishLine {
            x: width / 4,
            y: height - 1 - corridor,
            w: 2,
            h: corridor,
        };

        Self {
            width,
            height,
            walls,
            start,
            // Along the bottom corridor, away from the finish strip.
            start_heading: 270.,
            finish,
        }
    }

    /// Returns `true` if the cell is a border cell or outside the grid.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return true;
        }
        self.walls[y as usize * self.width + x as usize] != 0
    }

    /// Returns `true` if the cell lies on the finish strip.
    pub fn is_finish(&self, x: i32, y: i32) -> bool {
        self.finish.contains(x, y)
    }

    /// Returns the start position.
    pub fn start(&self) -> (f32, f32) {
        self.start
    }

    /// Returns the start heading in degrees.
    pub fn start_heading(&self) -> f32 {
        self.start_heading
    }

    /// Returns the width of the grid in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the grid in cells.
    pub fn height(&self) -> usize {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_circuit_has_a_drivable_start() {
        let track = TrackMap::ring_circuit(60, 40, 8);
        let (sx, sy) = track.start();
        assert!(!track.is_wall(sx as i32, sy as i32));
    }

    #[test]
    fn out_of_bounds_is_wall() {
        let track = TrackMap::ring_circuit(60, 40, 8);
        assert!(track.is_wall(-1, 5));
        assert!(track.is_wall(60, 5));
        assert!(track.is_wall(5, 40));
        assert!(track.is_wall(0, 0));
    }

    #[test]
    fn finish_strip_is_in_the_bottom_corridor() {
        let track = TrackMap::ring_circuit(60, 40, 8);
        assert!(track.is_finish(15, 35));
        assert!(!track.is_wall(15, 35));
        assert!(!track.is_finish(30, 35));
    }

    #[test]
    fn mask_length_is_validated() {
        let finish = FinishLine { x: 0, y: 0, w: 1, h: 1 };
        assert!(TrackMap::new(4, 4, vec![0; 15], (1., 1.), 0., finish).is_err());
    }
}
