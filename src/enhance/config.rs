//! Enhancement run configuration
//!
//! An [`EnhanceConfig`] is validated once when built and never mutated
//! afterwards; every stage receives it (or the fields it needs) explicitly.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::utils::threshold::ThresholdMethod;

/// How voxels just outside the brain mask are rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryMode {
    /// Everything outside the mask is exactly 0
    StrictBlack,
    /// A one-voxel ring outside the mask keeps 20% of the denoised signal
    SoftBlend,
}

impl BoundaryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryMode::StrictBlack => "strict-black",
            BoundaryMode::SoftBlend => "soft-blend",
        }
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict-black" | "black" => Ok(BoundaryMode::StrictBlack),
            "soft-blend" | "soft" => Ok(BoundaryMode::SoftBlend),
            other => Err(Error::invalid("boundary_mode", other, "expected strict-black or soft-blend")),
        }
    }
}

/// Parameters for one named enhancement run
#[derive(Clone, Debug, PartialEq)]
pub struct EnhanceConfig {
    name: String,
    method: ThresholdMethod,
    refine_mask: bool,
    boundary_mode: BoundaryMode,
    kernel_size: usize,
    percentiles: (f64, f64),
    bin_count: usize,
    equalize: bool,
    blend_weight: f64,
}

impl EnhanceConfig {
    pub fn builder(name: impl Into<String>) -> EnhanceConfigBuilder {
        EnhanceConfigBuilder::new(name)
    }

    /// The three comparison runs: adaptive without refinement, and
    /// refined percentile and Otsu masks, all on a black background
    pub fn standard_set() -> Vec<EnhanceConfig> {
        let presets = [
            ("adaptive_black", ThresholdMethod::Adaptive, false),
            ("percentile_refined", ThresholdMethod::Percentile, true),
            ("otsu_refined", ThresholdMethod::Otsu, true),
        ];
        presets
            .into_iter()
            .map(|(name, method, refine)| EnhanceConfig {
                name: name.to_string(),
                method,
                refine_mask: refine,
                ..EnhanceConfigBuilder::new(name).config
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> ThresholdMethod {
        self.method
    }

    /// Whether mask refinement runs. Never true for the adaptive method.
    pub fn refine_mask(&self) -> bool {
        self.refine_mask && self.method != ThresholdMethod::Adaptive
    }

    pub fn boundary_mode(&self) -> BoundaryMode {
        self.boundary_mode
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    pub fn percentiles(&self) -> (f64, f64) {
        self.percentiles
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn equalize(&self) -> bool {
        self.equalize
    }

    pub fn blend_weight(&self) -> f64 {
        self.blend_weight
    }
}

impl fmt::Display for EnhanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (method={}, refine={}, boundary={}, equalize={})",
            self.name, self.method, self.refine_mask(), self.boundary_mode, self.equalize
        )
    }
}

/// Builder for [`EnhanceConfig`]; defaults match the adaptive black-background run
#[derive(Clone, Debug)]
pub struct EnhanceConfigBuilder {
    config: EnhanceConfig,
}

impl EnhanceConfigBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: EnhanceConfig {
                name: name.into(),
                method: ThresholdMethod::Adaptive,
                refine_mask: true,
                boundary_mode: BoundaryMode::StrictBlack,
                kernel_size: 3,
                percentiles: (1.0, 99.0),
                bin_count: 256,
                equalize: true,
                blend_weight: 0.7,
            },
        }
    }

    pub fn method(mut self, method: ThresholdMethod) -> Self {
        self.config.method = method;
        self
    }

    pub fn refine_mask(mut self, refine: bool) -> Self {
        self.config.refine_mask = refine;
        self
    }

    pub fn boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.config.boundary_mode = mode;
        self
    }

    pub fn kernel_size(mut self, size: usize) -> Self {
        self.config.kernel_size = size;
        self
    }

    pub fn percentiles(mut self, low: f64, high: f64) -> Self {
        self.config.percentiles = (low, high);
        self
    }

    pub fn bin_count(mut self, bins: usize) -> Self {
        self.config.bin_count = bins;
        self
    }

    pub fn equalize(mut self, equalize: bool) -> Self {
        self.config.equalize = equalize;
        self
    }

    pub fn blend_weight(mut self, weight: f64) -> Self {
        self.config.blend_weight = weight;
        self
    }

    pub fn build(self) -> Result<EnhanceConfig> {
        let c = self.config;
        if c.name.trim().is_empty() {
            return Err(Error::invalid("name", "\"\"", "configuration name must not be empty"));
        }
        if c.kernel_size == 0 || c.kernel_size % 2 == 0 {
            return Err(Error::invalid("kernel_size", c.kernel_size, "must be a positive odd number"));
        }
        let (low, high) = c.percentiles;
        if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low >= high {
            return Err(Error::invalid(
                "percentiles",
                format!("({}, {})", low, high),
                "need 0 <= low < high <= 100",
            ));
        }
        if c.bin_count < 2 {
            return Err(Error::invalid("bin_count", c.bin_count, "need at least 2 bins"));
        }
        if !(0.0..=1.0).contains(&c.blend_weight) {
            return Err(Error::invalid("blend_weight", c.blend_weight, "must lie in [0, 1]"));
        }
        Ok(c)
    }
}
