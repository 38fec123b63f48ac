use camera_intrinsic_model::*;
use glam::Vec2;
use nalgebra as na;

use super::generic::CameraModel as FrameCamera;
use crate::error::CameraError;

/// Any calibrated `camera-intrinsic-model` can back a frame. Pixels are unprojected to
/// bearing rays and re-projected through the model's pinhole part `fx fy cx cy`.
impl FrameCamera for GenericModel<f64> {
    fn intrinsics(&self) -> na::Matrix3<f64> {
        let p = self.camera_params();
        na::Matrix3::new(
            p[0], 0.0, p[2], //
            0.0, p[1], p[3], //
            0.0, 0.0, 1.0,
        )
    }

    fn distortion(&self) -> na::DVector<f64> {
        let params = self.params();
        if params.len() <= 4 {
            return na::DVector::zeros(0);
        }
        params.rows(4, params.len() - 4).into_owned()
    }

    fn undistort_points(&self, pts: &[Vec2]) -> Result<Vec<Vec2>, CameraError> {
        let p = self.camera_params();
        let (fx, fy, cx, cy) = (p[0], p[1], p[2], p[3]);
        let p2ds: Vec<na::Vector2<f64>> = pts
            .iter()
            .map(|pt| na::Vector2::new(pt.x as f64, pt.y as f64))
            .collect();
        let rays = self.unproject(&p2ds);
        if rays.len() != pts.len() {
            return Err(CameraError::PointCountMismatch {
                expected: pts.len(),
                got: rays.len(),
            });
        }
        rays.iter()
            .zip(pts)
            .map(|(ray, pt)| match ray {
                Some(r) if r.z > 0.0 => Ok(Vec2::new(
                    (fx * r.x / r.z + cx) as f32,
                    (fy * r.y / r.z + cy) as f32,
                )),
                _ => Err(CameraError::Unprojectable { x: pt.x, y: pt.y }),
            })
            .collect()
    }
}
