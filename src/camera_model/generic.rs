use glam::Vec2;
use nalgebra as na;
use rayon::prelude::*;

use crate::error::CameraError;

const UNDISTORT_ITERATIONS: usize = 20;

/// Camera capability consumed by frames: intrinsics, distortion and pixel undistortion.
pub trait CameraModel
where
    Self: Send + Sync,
{
    /// 3x3 pinhole projection matrix.
    fn intrinsics(&self) -> na::Matrix3<f64>;
    fn distortion(&self) -> na::DVector<f64>;
    /// Maps distorted pixel coordinates to undistorted pixel coordinates, order preserved.
    fn undistort_points(&self, pts: &[Vec2]) -> Result<Vec<Vec2>, CameraError>;

    /// Lens distortion counts as present when the first coefficient is non-zero.
    fn has_distortion(&self) -> bool {
        self.distortion().iter().next().is_some_and(|k1| *k1 != 0.0)
    }
}

/// Pinhole camera with radial-tangential distortion `[k1, k2, p1, p2, k3]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadTanCamera {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub width: u32,
    pub height: u32,
    pub dist: [f64; 5],
}

impl RadTanCamera {
    pub fn new(
        fx: f64,
        fy: f64,
        cx: f64,
        cy: f64,
        width: u32,
        height: u32,
        dist: [f64; 5],
    ) -> RadTanCamera {
        RadTanCamera {
            fx,
            fy,
            cx,
            cy,
            width,
            height,
            dist,
        }
    }

    /// Camera without lens distortion.
    pub fn pinhole(fx: f64, fy: f64, cx: f64, cy: f64, width: u32, height: u32) -> RadTanCamera {
        Self::new(fx, fy, cx, cy, width, height, [0.0; 5])
    }

    /// Applies the forward distortion model to a normalized point.
    fn distort_normalized(&self, x: f64, y: f64) -> (f64, f64) {
        let [k1, k2, p1, p2, k3] = self.dist;
        let r2 = x * x + y * y;
        let radial = 1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2;
        let dx = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
        let dy = p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
        (x * radial + dx, y * radial + dy)
    }

    /// Distorts an ideal pixel; inverse of `undistort_one`.
    pub fn distort_pixel(&self, pt: Vec2) -> Vec2 {
        let x = (pt.x as f64 - self.cx) / self.fx;
        let y = (pt.y as f64 - self.cy) / self.fy;
        let (xd, yd) = self.distort_normalized(x, y);
        Vec2::new(
            (xd * self.fx + self.cx) as f32,
            (yd * self.fy + self.cy) as f32,
        )
    }

    fn undistort_one(&self, pt: &Vec2) -> Result<Vec2, CameraError> {
        let [k1, k2, p1, p2, k3] = self.dist;
        let x0 = (pt.x as f64 - self.cx) / self.fx;
        let y0 = (pt.y as f64 - self.cy) / self.fy;

        // fixed-point iteration on the forward model
        let mut x = x0;
        let mut y = y0;
        for _ in 0..UNDISTORT_ITERATIONS {
            let r2 = x * x + y * y;
            let radial = 1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2;
            let dx = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
            let dy = p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
            x = (x0 - dx) / radial;
            y = (y0 - dy) / radial;
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(CameraError::Unprojectable { x: pt.x, y: pt.y });
        }
        Ok(Vec2::new(
            (x * self.fx + self.cx) as f32,
            (y * self.fy + self.cy) as f32,
        ))
    }
}

impl CameraModel for RadTanCamera {
    fn intrinsics(&self) -> na::Matrix3<f64> {
        na::Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    fn distortion(&self) -> na::DVector<f64> {
        na::DVector::from_row_slice(&self.dist)
    }

    fn undistort_points(&self, pts: &[Vec2]) -> Result<Vec<Vec2>, CameraError> {
        if self.dist.iter().all(|d| *d == 0.0) {
            return Ok(pts.to_vec());
        }
        pts.par_iter().map(|p| self.undistort_one(p)).collect()
    }
}
