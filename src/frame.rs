use std::sync::Arc;

use image::DynamicImage;
use log::trace;

use crate::calibration::{GridCalibration, TrackingSession};
use crate::camera_model::CameraModel;
use crate::detected_points::Feature;
use crate::error::{CameraError, FrameError};
use crate::extractor::{FeatureExtractor, extract_features};
use crate::grid::FeatureGrid;
use crate::pyramid::ScalePyramid;
use crate::types::KeyPoint;

/// One captured image with its detected features and their spatial index.
pub struct Frame {
    id: u64,
    timestamp: f64,
    image_size: (u32, u32),
    camera: Arc<dyn CameraModel>,
    pyramid: ScalePyramid,
    features: Vec<Feature>,
    grid: FeatureGrid,
}

impl Frame {
    /// Builds a frame: extracts features, calibrates the session on its first frame,
    /// undistorts keypoints and indexes them in the grid.
    ///
    /// The first frame of a session fixes the grid calibration from the camera and the
    /// image size alone, so it calibrates even when it has no keypoints. Use
    /// [`TrackingSession::with_calibration`] to fix the geometry up front instead.
    pub fn new(
        session: &TrackingSession,
        camera: Arc<dyn CameraModel>,
        image: &DynamicImage,
        timestamp: f64,
        extractor: &mut dyn FeatureExtractor,
    ) -> Result<Frame, FrameError> {
        FrameBuilder::new(session)
            .camera(camera)
            .extractor(extractor)
            .timestamp(timestamp)
            .build(image)
    }

    pub fn builder(session: &TrackingSession) -> FrameBuilder<'_> {
        FrameBuilder::new(session)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// `(width, height)` of the source image.
    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    pub fn camera(&self) -> &Arc<dyn CameraModel> {
        &self.camera
    }

    pub fn pyramid(&self) -> &ScalePyramid {
        &self.pyramid
    }

    pub fn num_keypoints(&self) -> usize {
        self.features.len()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, idx: usize) -> Option<&Feature> {
        self.features.get(idx)
    }

    pub fn grid(&self) -> &FeatureGrid {
        &self.grid
    }

    pub fn calibration(&self) -> &GridCalibration {
        self.grid.calibration()
    }

    /// Grid cell of an undistorted keypoint.
    pub fn cell_of(&self, kp: &KeyPoint) -> Option<(usize, usize)> {
        self.grid.cell_of(kp.x(), kp.y())
    }

    /// Whether an undistorted pixel falls inside the calibrated image bounds.
    pub fn is_in_image(&self, x: f32, y: f32) -> bool {
        self.calibration().bounds().contains(x, y)
    }

    /// Features within the axis-aligned box of half-size `r` around `(x, y)`,
    /// optionally restricted to octaves `[min_level, max_level]`.
    pub fn features_in_area(
        &self,
        x: f32,
        y: f32,
        r: f32,
        min_level: i32,
        max_level: i32,
    ) -> Vec<usize> {
        self.grid
            .features_in_area(&self.features, x, y, r, min_level, max_level)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .field("image_size", &self.image_size)
            .field("num_keypoints", &self.features.len())
            .field("gridded", &self.grid.len())
            .finish()
    }
}

/// Collects frame inputs; missing capabilities are reported by `build`.
pub struct FrameBuilder<'a> {
    session: &'a TrackingSession,
    camera: Option<Arc<dyn CameraModel>>,
    extractor: Option<&'a mut dyn FeatureExtractor>,
    timestamp: f64,
}

impl<'a> FrameBuilder<'a> {
    pub fn new(session: &'a TrackingSession) -> FrameBuilder<'a> {
        FrameBuilder {
            session,
            camera: None,
            extractor: None,
            timestamp: 0.0,
        }
    }

    pub fn camera(mut self, camera: Arc<dyn CameraModel>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn extractor(mut self, extractor: &'a mut dyn FeatureExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self, image: &DynamicImage) -> Result<Frame, FrameError> {
        let camera = self.camera.ok_or(FrameError::MissingCamera)?;
        let extractor = self.extractor.ok_or(FrameError::MissingExtractor)?;

        let id = self.session.next_frame_id();
        let pyramid = ScalePyramid::new(extractor.n_levels(), extractor.scale_factor());
        let image_size = (image.width(), image.height());

        let mut features = extract_features(extractor, image, id)?;
        let calibration = self
            .session
            .calibrate_once(camera.as_ref(), image_size.0, image_size.1)?;

        let grid = if features.is_empty() {
            FeatureGrid::new(calibration)
        } else {
            undistort_features(camera.as_ref(), &mut features)?;
            FeatureGrid::build(calibration, &features)
        };
        trace!(
            "frame {} ({}x{}): {} keypoints, {} gridded",
            id,
            image_size.0,
            image_size.1,
            features.len(),
            grid.len()
        );

        Ok(Frame {
            id,
            timestamp: self.timestamp,
            image_size,
            camera,
            pyramid,
            features,
            grid,
        })
    }
}

fn undistort_features(
    camera: &dyn CameraModel,
    features: &mut [Feature],
) -> Result<(), FrameError> {
    if !camera.has_distortion() {
        return Ok(());
    }
    let pts: Vec<_> = features.iter().map(|f| f.keypoint.pt).collect();
    let undistorted = camera.undistort_points(&pts)?;
    if undistorted.len() != features.len() {
        return Err(CameraError::PointCountMismatch {
            expected: features.len(),
            got: undistorted.len(),
        }
        .into());
    }
    for (feature, pt) in features.iter_mut().zip(undistorted) {
        feature.undistorted = feature.keypoint.with_pt(pt);
    }
    Ok(())
}
