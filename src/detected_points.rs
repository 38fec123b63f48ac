use serde::{Deserialize, Serialize};

use crate::types::{Descriptor, KeyPoint};

/// Raw output of a feature extractor. `descriptors[i]` belongs to `keypoints[i]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Detections {
    pub keypoints: Vec<KeyPoint>,
    pub descriptors: Vec<Descriptor>,
}

impl Detections {
    pub fn new(keypoints: Vec<KeyPoint>, descriptors: Vec<Descriptor>) -> Detections {
        Detections {
            keypoints,
            descriptors,
        }
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// One detected feature, owned by the frame whose id it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub frame_id: u64,
    pub keypoint: KeyPoint,
    /// Keypoint after lens undistortion; equal to `keypoint` for an undistorted camera.
    pub undistorted: KeyPoint,
    pub descriptor: Descriptor,
}

impl Feature {
    pub fn octave(&self) -> i32 {
        self.keypoint.octave
    }
}
