use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Length in bytes of a binary descriptor (256 bits).
pub const DESCRIPTOR_BYTES: usize = 32;

/// A detected keypoint: pixel position plus the pyramid level it was found at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub pt: Vec2,
    pub octave: i32,
    #[serde(default = "default_angle")]
    pub angle: f32,
    #[serde(default)]
    pub response: f32,
}

fn default_angle() -> f32 {
    -1.0
}

impl KeyPoint {
    pub fn new(x: f32, y: f32, octave: i32) -> KeyPoint {
        KeyPoint {
            pt: Vec2::new(x, y),
            octave,
            angle: default_angle(),
            response: 0.0,
        }
    }

    /// Same keypoint moved to another pixel position.
    pub fn with_pt(&self, pt: Vec2) -> KeyPoint {
        KeyPoint { pt, ..*self }
    }

    pub fn x(&self) -> f32 {
        self.pt.x
    }

    pub fn y(&self) -> f32 {
        self.pt.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor(pub [u8; DESCRIPTOR_BYTES]);

impl Descriptor {
    pub fn zeros() -> Descriptor {
        Descriptor([0; DESCRIPTOR_BYTES])
    }

    /// Hamming distance between two descriptors.
    pub fn distance(&self, other: &Descriptor) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::zeros()
    }
}

impl From<[u8; DESCRIPTOR_BYTES]> for Descriptor {
    fn from(bytes: [u8; DESCRIPTOR_BYTES]) -> Self {
        Descriptor(bytes)
    }
}
