//! Fixed-resolution spatial index over the calibrated image bounds.
//!
//! Cells hold indices into the owning frame's feature list, in insertion order. Cell
//! storage is column-major so queries visit columns outer, rows inner.

use crate::calibration::GridCalibration;
use crate::detected_points::Feature;

pub const GRID_COLS: usize = 64;
pub const GRID_ROWS: usize = 48;

#[derive(Debug, Clone)]
pub struct FeatureGrid {
    calibration: GridCalibration,
    cells: Vec<Vec<usize>>,
}

impl FeatureGrid {
    pub fn new(calibration: GridCalibration) -> FeatureGrid {
        FeatureGrid {
            calibration,
            cells: vec![Vec::new(); GRID_COLS * GRID_ROWS],
        }
    }

    /// Assigns every feature to the cell of its undistorted position. Features outside
    /// the grid are left out of the index.
    pub fn build(calibration: GridCalibration, features: &[Feature]) -> FeatureGrid {
        let reserve = (0.5 * features.len() as f32 / (GRID_COLS * GRID_ROWS) as f32) as usize;
        let mut cells = vec![Vec::with_capacity(reserve); GRID_COLS * GRID_ROWS];
        for (idx, feature) in features.iter().enumerate() {
            let pt = feature.undistorted.pt;
            if let Some((col, row)) = position_in_grid(&calibration, pt.x, pt.y) {
                cells[Self::flat(col, row)].push(idx);
            }
        }
        FeatureGrid { calibration, cells }
    }

    fn flat(col: usize, row: usize) -> usize {
        col * GRID_ROWS + row
    }

    pub fn calibration(&self) -> &GridCalibration {
        &self.calibration
    }

    /// Grid cell `(col, row)` containing pixel `(x, y)`, if any.
    pub fn cell_of(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        position_in_grid(&self.calibration, x, y)
    }

    /// Feature indices stored in cell `(col, row)`.
    pub fn cell(&self, col: usize, row: usize) -> &[usize] {
        if col >= GRID_COLS || row >= GRID_ROWS {
            return &[];
        }
        self.cells
            .get(Self::flat(col, row))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of indexed features.
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    /// Indices of features whose undistorted position lies strictly within `r` of
    /// `(x, y)` on both axes.
    ///
    /// Level filtering applies when `min_level > 0` or `max_level >= 0`; a negative
    /// `max_level` leaves the upper end open. Results follow grid order: columns
    /// ascending, then rows, then cell insertion order.
    pub fn features_in_area(
        &self,
        features: &[Feature],
        x: f32,
        y: f32,
        r: f32,
        min_level: i32,
        max_level: i32,
    ) -> Vec<usize> {
        let mut indices = Vec::new();
        let b = self.calibration.bounds();
        let col_scale = self.calibration.col_scale();
        let row_scale = self.calibration.row_scale();

        let min_col = (((x - b.min_x - r) * col_scale).floor() as i64).max(0);
        if min_col >= GRID_COLS as i64 {
            return indices;
        }
        let max_col = (((x - b.min_x + r) * col_scale).ceil() as i64).min(GRID_COLS as i64 - 1);
        if max_col < 0 {
            return indices;
        }
        let min_row = (((y - b.min_y - r) * row_scale).floor() as i64).max(0);
        if min_row >= GRID_ROWS as i64 {
            return indices;
        }
        let max_row = (((y - b.min_y + r) * row_scale).ceil() as i64).min(GRID_ROWS as i64 - 1);
        if max_row < 0 {
            return indices;
        }

        let check_levels = min_level > 0 || max_level >= 0;
        for col in min_col as usize..=max_col as usize {
            for row in min_row as usize..=max_row as usize {
                for &idx in &self.cells[Self::flat(col, row)] {
                    let Some(feature) = features.get(idx) else {
                        continue;
                    };
                    let kp = &feature.undistorted;
                    if check_levels {
                        if kp.octave < min_level {
                            continue;
                        }
                        if max_level >= 0 && kp.octave > max_level {
                            continue;
                        }
                    }
                    if (kp.x() - x).abs() < r && (kp.y() - y).abs() < r {
                        indices.push(idx);
                    }
                }
            }
        }
        indices
    }
}

fn position_in_grid(calibration: &GridCalibration, x: f32, y: f32) -> Option<(usize, usize)> {
    let b = calibration.bounds();
    let col = ((x - b.min_x) * calibration.col_scale()).round();
    let row = ((y - b.min_y) * calibration.row_scale()).round();
    // NaN fails every comparison
    if !(col >= 0.0 && col < GRID_COLS as f32 && row >= 0.0 && row < GRID_ROWS as f32) {
        return None;
    }
    Some((col as usize, row as usize))
}
