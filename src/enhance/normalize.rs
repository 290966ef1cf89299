//! Masked intensity normalization
//!
//! The whole volume is median filtered first so the filter sees real
//! neighborhood context, then the masked voxels are percentile-clipped and
//! rescaled linearly into `[0, bin_count - 1]`.

use tracing::{info, warn};

use crate::error::Result;
use crate::utils::median::median_filter_3d;
use crate::utils::stats::percentile_sorted;
use crate::volume::{Mask, Volume};

/// Rescaled brain voxels plus the denoised volume they came from
#[derive(Clone, Debug)]
pub struct ScaledVoxels {
    /// Values at the mask's voxels, in mask storage order
    pub values: Vec<f64>,
    /// Median-filtered copy of the whole source volume
    pub denoised: Vec<f64>,
    /// `(low, high)` percentile intensities of the masked denoised voxels
    pub intensity_range: (f64, f64),
    /// False when the range was flat and values passed through unscaled
    pub rescaled: bool,
}

/// Outcome of normalization
#[derive(Clone, Debug)]
pub enum Normalized {
    /// The mask selected nothing; the run's output is all zeros
    EmptyMask,
    Scaled(ScaledVoxels),
}

/// Denoise `volume` and rescale the voxels selected by `mask`.
///
/// # Arguments
/// * `kernel_size` - Median filter window (voxels per side, odd)
/// * `percentiles` - `(low, high)` clipping percentiles in [0, 100]
/// * `bin_count` - Output range is `[0, bin_count - 1]`
pub fn normalize(
    volume: &Volume,
    mask: &Mask,
    kernel_size: usize,
    percentiles: (f64, f64),
    bin_count: usize,
) -> Result<Normalized> {
    mask.check_shape(volume.dims)?;

    if mask.is_empty() {
        warn!("brain mask is empty, no brain tissue found");
        return Ok(Normalized::EmptyMask);
    }

    let (nx, ny, nz) = volume.dims;
    let denoised = median_filter_3d(&volume.data, nx, ny, nz, kernel_size);
    let brain: Vec<f64> = mask.indices().map(|i| denoised[i]).collect();

    let mut sorted = brain.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let low = percentile_sorted(&sorted, percentiles.0);
    let high = percentile_sorted(&sorted, percentiles.1);
    info!(low, high, voxels = brain.len(), "masked intensity range");

    let top = (bin_count.max(1) - 1) as f64;
    let (values, rescaled) = if high > low {
        let span = high - low;
        let values = brain.iter().map(|&v| ((v - low) / span * top).clamp(0.0, top)).collect();
        (values, true)
    } else {
        warn!(low, high, "flat intensity range inside mask, values left unscaled");
        (brain, false)
    };

    Ok(Normalized::Scaled(ScaledVoxels {
        values,
        denoised,
        intensity_range: (low, high),
        rescaled,
    }))
}
