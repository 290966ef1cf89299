//! Automatic thresholding algorithms
//!
//! Three interchangeable strategies for separating brain tissue from
//! background:
//! - Otsu's method on a 256-bin histogram over `[0, max]`
//! - 5th percentile of the positive voxels
//! - Adaptive `max(mean - 2*std, 1st percentile)` over the positive voxels

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::error::{Error, Result};
use crate::utils::stats::{mean_std, percentile, Histogram};
use crate::volume::Volume;

/// Number of histogram bins used by Otsu's method
pub const OTSU_BINS: usize = 256;

/// Percentile of positive voxels used by the percentile method
pub const PERCENTILE_THRESHOLD: f64 = 5.0;

/// Lower bound percentile for the adaptive method
pub const ADAPTIVE_FLOOR_PERCENTILE: f64 = 1.0;

const WEIGHT_EPS: f64 = 1e-10;

/// Threshold selection strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThresholdMethod {
    Otsu,
    Percentile,
    Adaptive,
}

impl ThresholdMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdMethod::Otsu => "otsu",
            ThresholdMethod::Percentile => "percentile",
            ThresholdMethod::Adaptive => "adaptive",
        }
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "otsu" => Ok(ThresholdMethod::Otsu),
            "percentile" => Ok(ThresholdMethod::Percentile),
            "adaptive" => Ok(ThresholdMethod::Adaptive),
            other => Err(Error::invalid("method", other, "expected otsu, percentile or adaptive")),
        }
    }
}

/// Compute the intensity threshold of `volume` with the given strategy
pub fn estimate_threshold(volume: &Volume, method: ThresholdMethod) -> Result<f64> {
    let threshold = match method {
        ThresholdMethod::Otsu => otsu_threshold(&volume.data, OTSU_BINS),
        ThresholdMethod::Percentile => percentile_threshold(volume)?,
        ThresholdMethod::Adaptive => adaptive_threshold(volume),
    };
    info!(method = %method, threshold, "estimated background threshold");
    Ok(threshold)
}

/// Otsu's method for automatic threshold selection
///
/// Builds a histogram over `[0, max(data)]` (negative values are ignored) and
/// evaluates the inter-class variance at every boundary between bin `i` and
/// bin `i + 1`, using cumulative weights and means accumulated from both ends.
/// Returns the center of the bin below the best boundary.
///
/// A volume with no positive intensity has no foreground to separate, and
/// yields 0.
///
/// # Arguments
/// * `data` - Input data (e.g. flattened 3D image)
/// * `num_bins` - Number of histogram bins (typically 256)
pub fn otsu_threshold(data: &[f64], num_bins: usize) -> f64 {
    let max_val = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if data.is_empty() || !(max_val > 0.0) || num_bins < 2 {
        return 0.0;
    }

    let hist = Histogram::new(data, num_bins, (0.0, max_val));
    let centers = hist.centers();
    let n = hist.num_bins();

    // Cumulative weight and weighted sum from the low end
    let mut weight_low = vec![0.0; n];
    let mut sum_low = vec![0.0; n];
    let (mut w, mut s) = (0.0, 0.0);
    for i in 0..n {
        w += hist.counts[i];
        s += hist.counts[i] * centers[i];
        weight_low[i] = w;
        sum_low[i] = s;
    }

    // ... and from the high end
    let mut weight_high = vec![0.0; n];
    let mut sum_high = vec![0.0; n];
    let (mut w, mut s) = (0.0, 0.0);
    for i in (0..n).rev() {
        w += hist.counts[i];
        s += hist.counts[i] * centers[i];
        weight_high[i] = w;
        sum_high[i] = s;
    }

    let mut best_bin = 0;
    let mut best_variance = f64::NEG_INFINITY;
    for i in 0..n - 1 {
        let mean_low = sum_low[i] / (weight_low[i] + WEIGHT_EPS);
        let mean_high = sum_high[i + 1] / (weight_high[i + 1] + WEIGHT_EPS);
        let variance = weight_low[i] * weight_high[i + 1] * (mean_low - mean_high).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_bin = i;
        }
    }

    centers[best_bin]
}

/// 5th percentile of the strictly positive voxels
pub fn percentile_threshold(volume: &Volume) -> Result<f64> {
    percentile(&volume.positive_values(), PERCENTILE_THRESHOLD).ok_or(Error::EmptyVolume {
        stage: "percentile threshold",
        percentile: PERCENTILE_THRESHOLD,
    })
}

/// `max(mean - 2*std, 1st percentile)` of the strictly positive voxels.
///
/// Returns 0 when the volume has no positive voxels.
pub fn adaptive_threshold(volume: &Volume) -> f64 {
    let positive = volume.positive_values();
    let (mean, std) = match mean_std(&positive) {
        Some(stats) => stats,
        None => return 0.0,
    };
    let floor = percentile(&positive, ADAPTIVE_FLOOR_PERCENTILE).unwrap_or(0.0);
    (mean - 2.0 * std).max(floor)
}
