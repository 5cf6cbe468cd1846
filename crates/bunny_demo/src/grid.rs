//! Diagonal sprite chain derived from the demo offset.
//!
//! For `start = floor(offset)` the grid yields `i = start, start + 50, ...,
//! start + 950`: exactly twenty placements at `(i, i)`, each rotated by
//! `i / 200` radians. The iterator is recomputed every frame and holds no state
//! beyond its own cursor. Coordinates are computed in f64 and narrowed only
//! when the placement is built.

use glam::Vec2;

pub const GRID_COUNT: usize = 20;
pub const GRID_STEP: i64 = 50;
pub const ROTATION_DIVISOR: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    pub rotation: f32,
}

#[derive(Debug, Clone)]
pub struct DiagonalGrid {
    start: i64,
    index: usize,
}

impl DiagonalGrid {
    /// Non-finite offsets saturate (NaN maps to zero); the count stays twenty.
    pub fn new(offset: f64) -> Self {
        Self {
            start: offset.floor() as i64,
            index: 0,
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }
}

impl Iterator for DiagonalGrid {
    type Item = Placement;

    fn next(&mut self) -> Option<Placement> {
        if self.index >= GRID_COUNT {
            return None;
        }
        let i = self
            .start
            .saturating_add(self.index as i64 * GRID_STEP) as f64;
        self.index += 1;
        Some(Placement {
            position: Vec2::splat(i as f32),
            rotation: (i / ROTATION_DIVISOR) as f32,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = GRID_COUNT - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DiagonalGrid {}
