pub mod generic;
pub mod intrinsic;

pub use generic::{CameraModel, RadTanCamera};
