//! Undistorted image bounds, grid cell geometry and the session that computes them once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use glam::Vec2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::camera_model::CameraModel;
use crate::error::{CameraError, FrameError};
use crate::grid::{GRID_COLS, GRID_ROWS};

/// Axis-aligned pixel rectangle covered by the undistorted image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl ImageBounds {
    /// Bounds of an image without lens distortion.
    pub fn from_size(width: u32, height: u32) -> ImageBounds {
        ImageBounds {
            min_x: 0.0,
            max_x: width as f32,
            min_y: 0.0,
            max_y: height as f32,
        }
    }

    /// Bounds of the undistorted image, from the camera's undistorted image corners.
    pub fn undistorted(
        camera: &dyn CameraModel,
        width: u32,
        height: u32,
    ) -> Result<ImageBounds, FrameError> {
        if !camera.has_distortion() {
            return Ok(Self::from_size(width, height));
        }
        let (w, h) = (width as f32, height as f32);
        // top-left, top-right, bottom-left, bottom-right
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(w, 0.0),
            Vec2::new(0.0, h),
            Vec2::new(w, h),
        ];
        let c = camera.undistort_points(&corners)?;
        if c.len() != corners.len() {
            return Err(CameraError::PointCountMismatch {
                expected: corners.len(),
                got: c.len(),
            }
            .into());
        }
        Ok(ImageBounds {
            min_x: c[0].x.min(c[2].x),
            max_x: c[1].x.max(c[3].x),
            min_y: c[0].y.min(c[1].y),
            max_y: c[2].y.max(c[3].y),
        })
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Half-open containment: `min <= p < max` on both axes.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }
}

/// Frozen grid geometry shared by every frame of a camera session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCalibration {
    bounds: ImageBounds,
    /// Columns per pixel along x: `GRID_COLS / (max_x - min_x)`.
    col_scale: f32,
    /// Rows per pixel along y: `GRID_ROWS / (max_y - min_y)`.
    row_scale: f32,
}

impl GridCalibration {
    pub fn from_bounds(bounds: ImageBounds) -> Result<GridCalibration, FrameError> {
        let (w, h) = (bounds.width(), bounds.height());
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(FrameError::DegenerateBounds {
                min_x: bounds.min_x,
                max_x: bounds.max_x,
                min_y: bounds.min_y,
                max_y: bounds.max_y,
            });
        }
        Ok(GridCalibration {
            bounds,
            col_scale: GRID_COLS as f32 / w,
            row_scale: GRID_ROWS as f32 / h,
        })
    }

    /// Computes grid geometry for a `width` x `height` image seen through `camera`.
    pub fn compute(
        camera: &dyn CameraModel,
        width: u32,
        height: u32,
    ) -> Result<GridCalibration, FrameError> {
        let calibration = Self::from_bounds(ImageBounds::undistorted(camera, width, height)?)?;
        debug!(
            "grid calibration for {}x{}: x [{:.2}, {:.2}] y [{:.2}, {:.2}], cell {:.3}x{:.3} px",
            width,
            height,
            calibration.bounds.min_x,
            calibration.bounds.max_x,
            calibration.bounds.min_y,
            calibration.bounds.max_y,
            calibration.cell_width(),
            calibration.cell_height(),
        );
        Ok(calibration)
    }

    pub fn bounds(&self) -> &ImageBounds {
        &self.bounds
    }

    pub fn col_scale(&self) -> f32 {
        self.col_scale
    }

    pub fn row_scale(&self) -> f32 {
        self.row_scale
    }

    /// Pixel extent of one grid column.
    pub fn cell_width(&self) -> f32 {
        self.bounds.width() / GRID_COLS as f32
    }

    /// Pixel extent of one grid row.
    pub fn cell_height(&self) -> f32 {
        self.bounds.height() / GRID_ROWS as f32
    }
}

/// State shared by all frames of one camera session: the frame id counter and the
/// grid calibration, computed from the first frame and never recomputed.
#[derive(Debug, Default)]
pub struct TrackingSession {
    next_frame_id: AtomicU64,
    calibration: Mutex<Option<GridCalibration>>,
}

impl TrackingSession {
    pub fn new() -> TrackingSession {
        TrackingSession::default()
    }

    /// Session whose frames use an already computed calibration.
    pub fn with_calibration(calibration: GridCalibration) -> TrackingSession {
        TrackingSession {
            next_frame_id: AtomicU64::new(0),
            calibration: Mutex::new(Some(calibration)),
        }
    }

    pub fn calibration(&self) -> Option<GridCalibration> {
        *self
            .calibration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration().is_some()
    }

    /// Id the next constructed frame receives.
    pub fn peek_next_frame_id(&self) -> u64 {
        self.next_frame_id.load(Ordering::SeqCst)
    }

    pub(crate) fn next_frame_id(&self) -> u64 {
        self.next_frame_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Returns the session calibration, computing it from `camera` and the image size
    /// if no frame has calibrated yet.
    pub fn calibrate_once(
        &self,
        camera: &dyn CameraModel,
        width: u32,
        height: u32,
    ) -> Result<GridCalibration, FrameError> {
        let mut guard = self.calibration.lock().unwrap_or_else(|poisoned| {
            warn!("calibration lock poisoned, recovering");
            poisoned.into_inner()
        });
        if let Some(calibration) = *guard {
            return Ok(calibration);
        }
        let calibration = GridCalibration::compute(camera, width, height)?;
        *guard = Some(calibration);
        Ok(calibration)
    }
}
