use serde::{Deserialize, Serialize};

use crate::camera_model::RadTanCamera;

/// Pinhole + radial-tangential camera description, as stored in json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub width: u32,
    pub height: u32,
    /// `[k1, k2, p1, p2, k3]`; shorter lists are zero-padded, empty means no distortion.
    #[serde(default)]
    pub distortion: Vec<f64>,
}

impl Default for CameraConfig {
    /// EuRoC MAV cam0.
    fn default() -> Self {
        Self {
            fx: 458.654,
            fy: 457.296,
            cx: 367.215,
            cy: 248.375,
            width: 752,
            height: 480,
            distortion: vec![-0.28340811, 0.07395907, 0.00019359, 1.76187114e-05],
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> RadTanCamera {
        let mut dist = [0.0; 5];
        for (d, v) in dist.iter_mut().zip(&self.distortion) {
            *d = *v;
        }
        RadTanCamera::new(
            self.fx,
            self.fy,
            self.cx,
            self.cy,
            self.width,
            self.height,
            dist,
        )
    }
}
