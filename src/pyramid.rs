/// Scale tables of the image pyramid an extractor detects on.
///
/// Level `i` is downscaled by `scale_factor^i`; the sigma tables are the squared scales,
/// used downstream to weight reprojection errors by octave.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalePyramid {
    n_levels: usize,
    scale_factor: f32,
    scale_factors: Vec<f32>,
    inv_scale_factors: Vec<f32>,
    level_sigma2: Vec<f32>,
    inv_level_sigma2: Vec<f32>,
}

impl ScalePyramid {
    pub fn new(n_levels: usize, scale_factor: f32) -> ScalePyramid {
        let scale_factors: Vec<f32> = (0..n_levels)
            .map(|level| scale_factor.powi(level as i32))
            .collect();
        let level_sigma2: Vec<f32> = scale_factors.iter().map(|s| s * s).collect();
        ScalePyramid {
            n_levels,
            scale_factor,
            inv_scale_factors: scale_factors.iter().map(|s| 1.0 / s).collect(),
            inv_level_sigma2: level_sigma2.iter().map(|s| 1.0 / s).collect(),
            scale_factors,
            level_sigma2,
        }
    }

    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn log_scale_factor(&self) -> f32 {
        self.scale_factor.ln()
    }

    pub fn scale_factors(&self) -> &[f32] {
        &self.scale_factors
    }

    pub fn inv_scale_factors(&self) -> &[f32] {
        &self.inv_scale_factors
    }

    pub fn level_sigma2(&self) -> &[f32] {
        &self.level_sigma2
    }

    pub fn inv_level_sigma2(&self) -> &[f32] {
        &self.inv_level_sigma2
    }
}
