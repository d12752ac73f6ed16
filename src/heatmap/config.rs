//! Grid size limits

use serde::{Deserialize, Serialize};

use crate::core::{LabError, LabResult};

/// Absolute ceiling on cells per grid, enforced even when `max_cells` is `None`
pub const MAX_GRID_CELLS: usize = 4_000_000;

/// Bounds on the number of cells a single heatmap may contain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLimits {
    /// Maximum x_steps * y_steps; `None` disables the cap
    /// Default: 6400 (an 80 x 80 grid)
    pub max_cells: Option<usize>,

    /// Per-axis floor applied after shrinking an oversized grid
    /// Default: 10
    pub min_steps: usize,
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            max_cells: Some(6400),
            min_steps: 10,
        }
    }
}

impl GridLimits {
    /// No cap at all
    pub fn unbounded() -> Self {
        Self {
            max_cells: None,
            ..Default::default()
        }
    }

    /// Step counts actually used for a requested grid.
    ///
    /// A step count of 0 is treated as 1. Oversized grids are shrunk keeping
    /// the x/y aspect ratio.
    pub fn resolve(&self, x_steps: usize, y_steps: usize) -> (usize, usize) {
        let x_steps = x_steps.max(1);
        let y_steps = y_steps.max(1);

        let Some(max_cells) = self.max_cells else {
            return (x_steps, y_steps);
        };
        if x_steps.saturating_mul(y_steps) <= max_cells {
            return (x_steps, y_steps);
        }

        let ratio = x_steps as f64 / y_steps as f64;
        let new_y = (max_cells as f64 / ratio).sqrt().floor();
        let new_x = (ratio * new_y).floor();
        (
            (new_x as usize).max(self.min_steps),
            (new_y as usize).max(self.min_steps),
        )
    }

    /// [`resolve`](Self::resolve), rejecting grids above [`MAX_GRID_CELLS`]
    pub fn checked_resolve(&self, x_steps: usize, y_steps: usize) -> LabResult<(usize, usize)> {
        let (x, y) = self.resolve(x_steps, y_steps);
        match x.checked_mul(y) {
            Some(cells) if cells <= MAX_GRID_CELLS => Ok((x, y)),
            _ => Err(LabError::validation(format!(
                "heatmap grid of {} x {} exceeds {} cells",
                x, y, MAX_GRID_CELLS
            ))),
        }
    }
}
