pub mod calibration;
pub mod camera_model;
pub mod config;
pub mod detected_points;
pub mod error;
pub mod extractor;
pub mod frame;
pub mod grid;
pub mod io;
pub mod pyramid;
pub mod types;

pub use calibration::{GridCalibration, ImageBounds, TrackingSession};
pub use camera_model::{CameraModel, RadTanCamera};
pub use detected_points::{Detections, Feature};
pub use error::{CameraError, ExtractorError, FrameError, IoError};
pub use extractor::{FeatureExtractor, RecordedExtractor};
pub use frame::{Frame, FrameBuilder};
pub use grid::{FeatureGrid, GRID_COLS, GRID_ROWS};
pub use types::{Descriptor, KeyPoint};
