use thiserror::Error;

/// Failures raised by a camera capability while undistorting points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("pixel ({x}, {y}) cannot be unprojected by the camera model")]
    Unprojectable { x: f32, y: f32 },

    #[error("undistortion returned {got} points for {expected} inputs")]
    PointCountMismatch { expected: usize, got: usize },
}

/// Failures raised by a feature extraction capability.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("image error: {0}")]
    Image(String),

    #[error("detector error: {0}")]
    Detector(String),
}

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("frame construction requires a camera model")]
    MissingCamera,

    #[error("frame construction requires a feature extractor")]
    MissingExtractor,

    #[error("extractor returned {keypoints} keypoints but {descriptors} descriptors")]
    DescriptorCountMismatch { keypoints: usize, descriptors: usize },

    #[error("undistorted bounds x:[{min_x}, {max_x}] y:[{min_y}, {max_y}] have no area")]
    DegenerateBounds {
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
    },

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Extraction(#[from] ExtractorError),
}

#[derive(Error, Debug)]
pub enum IoError {
    #[error("failed to access {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
