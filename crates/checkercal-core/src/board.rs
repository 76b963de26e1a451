//! Planar checkerboard geometry.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Checkerboard layout used for the whole session.
///
/// `cols`/`rows` are **inner corner** counts (not square counts). `spacing`
/// is the physical distance between adjacent corners; the calibrated
/// translations come out in the same unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub cols: u32,
    pub rows: u32,
    pub spacing: f64,
}

/// Board validation errors.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BoardError {
    #[error("board needs at least 2x2 inner corners (got {cols}x{rows})")]
    InvalidSize { cols: u32, rows: u32 },
    #[error("corner spacing must be finite and > 0 (got {0})")]
    InvalidSpacing(f64),
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            cols: 8,
            rows: 6,
            spacing: 25.0,
        }
    }
}

impl BoardGeometry {
    /// Validate and create a board.
    pub fn new(cols: u32, rows: u32, spacing: f64) -> Result<Self, BoardError> {
        let board = Self {
            cols,
            rows,
            spacing,
        };
        board.validate()?;
        Ok(board)
    }

    /// Check the invariants `new` enforces, for boards that came in through serde.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.cols < 2 || self.rows < 2 {
            return Err(BoardError::InvalidSize {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(BoardError::InvalidSpacing(self.spacing));
        }
        Ok(())
    }

    /// Number of inner corners on the board.
    #[inline]
    pub fn corner_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Board-frame 3D corner positions, row-major, `z = 0`.
    ///
    /// Point `i * cols + j` is `(j * spacing, i * spacing, 0)`, which is the
    /// order OpenCV reports chessboard corners in.
    pub fn object_points(&self) -> Vec<Point3<f64>> {
        let mut points = Vec::with_capacity(self.corner_count());
        for i in 0..self.rows {
            for j in 0..self.cols {
                points.push(Point3::new(
                    j as f64 * self.spacing,
                    i as f64 * self.spacing,
                    0.0,
                ));
            }
        }
        points
    }
}
