//! Feature extraction capability and the adapter that turns detector output into
//! frame-owned features.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::detected_points::{Detections, Feature};
use crate::error::{ExtractorError, FrameError};
use crate::types::{Descriptor, KeyPoint};

/// External keypoint detector + descriptor.
pub trait FeatureExtractor {
    /// Number of pyramid levels keypoints are detected on.
    fn n_levels(&self) -> usize;

    /// Scale ratio between consecutive pyramid levels.
    fn scale_factor(&self) -> f32;

    /// Detects keypoints and computes one descriptor per keypoint, in the same order.
    fn detect_and_compute(&mut self, image: &DynamicImage) -> Result<Detections, ExtractorError>;
}

/// Runs the extractor once and builds features in detector output order.
///
/// Zero keypoints is a normal outcome and yields an empty list. Keypoint and descriptor
/// counts must match, including when there are no keypoints.
pub fn extract_features(
    extractor: &mut dyn FeatureExtractor,
    image: &DynamicImage,
    frame_id: u64,
) -> Result<Vec<Feature>, FrameError> {
    let detections = extractor.detect_and_compute(image)?;
    if detections.keypoints.len() != detections.descriptors.len() {
        return Err(FrameError::DescriptorCountMismatch {
            keypoints: detections.keypoints.len(),
            descriptors: detections.descriptors.len(),
        });
    }
    if detections.is_empty() {
        return Ok(Vec::new());
    }
    Ok(detections
        .keypoints
        .into_iter()
        .zip(detections.descriptors)
        .map(|(keypoint, descriptor)| Feature {
            frame_id,
            keypoint,
            undistorted: keypoint,
            descriptor,
        })
        .collect())
}

/// Replays detections computed offline, e.g. dumped by another detector to json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedExtractor {
    pub n_levels: usize,
    pub scale_factor: f32,
    pub keypoints: Vec<KeyPoint>,
    pub descriptors: Vec<Descriptor>,
}

impl RecordedExtractor {
    pub fn new(n_levels: usize, scale_factor: f32, detections: Detections) -> RecordedExtractor {
        RecordedExtractor {
            n_levels,
            scale_factor,
            keypoints: detections.keypoints,
            descriptors: detections.descriptors,
        }
    }

    /// Keypoints with zeroed descriptors.
    pub fn from_keypoints(
        n_levels: usize,
        scale_factor: f32,
        keypoints: Vec<KeyPoint>,
    ) -> RecordedExtractor {
        let descriptors = vec![Descriptor::zeros(); keypoints.len()];
        RecordedExtractor {
            n_levels,
            scale_factor,
            keypoints,
            descriptors,
        }
    }
}

impl FeatureExtractor for RecordedExtractor {
    fn n_levels(&self) -> usize {
        self.n_levels
    }

    fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    fn detect_and_compute(&mut self, image: &DynamicImage) -> Result<Detections, ExtractorError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ExtractorError::Image(format!(
                "empty image {}x{}",
                image.width(),
                image.height()
            )));
        }
        Ok(Detections::new(
            self.keypoints.clone(),
            self.descriptors.clone(),
        ))
    }
}
