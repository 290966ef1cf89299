//! Single-configuration enhancement run

use tracing::info;

use crate::enhance::compose::compose;
use crate::enhance::config::EnhanceConfig;
use crate::enhance::equalize::equalize;
use crate::enhance::mask::{build_brain_mask, refine_mask};
use crate::enhance::normalize::{normalize, Normalized};
use crate::error::Result;
use crate::volume::{Mask, Volume};

/// What a run measured along the way
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub threshold: f64,
    pub mask_voxels: usize,
    /// `None` when the mask was empty
    pub intensity_range: Option<(f64, f64)>,
    pub rescaled: bool,
}

/// Output of one enhancement run
#[derive(Clone, Debug)]
pub struct Enhanced {
    /// Enhanced intensities with the source geometry and affine
    pub volume: Volume,
    /// Final brain mask
    pub mask: Mask,
    pub summary: RunSummary,
}

/// Extract the brain from `volume` and enhance it under `config`.
///
/// The source volume is only read. An empty brain mask yields an all-zero
/// output rather than an error.
pub fn enhance(volume: &Volume, config: &EnhanceConfig) -> Result<Enhanced> {
    let (mut mask, threshold) = build_brain_mask(volume, config.method())?;
    if config.refine_mask() {
        mask = refine_mask(&mask, volume)?;
    }
    let mask_voxels = mask.count();
    info!(config = config.name(), mask_voxels, total = volume.len(), "brain mask ready");

    let scaled = match normalize(volume, &mask, config.kernel_size(), config.percentiles(), config.bin_count())? {
        Normalized::EmptyMask => {
            return Ok(Enhanced {
                volume: volume.with_data(vec![0.0; volume.len()])?,
                mask,
                summary: RunSummary { threshold, mask_voxels, intensity_range: None, rescaled: false },
            });
        }
        Normalized::Scaled(scaled) => scaled,
    };

    let values = if config.equalize() {
        equalize(&scaled.values, config.bin_count(), config.blend_weight())
    } else {
        scaled.values
    };

    let data = compose(volume.dims, &mask, &values, &scaled.denoised, config.boundary_mode())?;

    Ok(Enhanced {
        volume: volume.with_data(data)?,
        mask,
        summary: RunSummary {
            threshold,
            mask_voxels,
            intensity_range: Some(scaled.intensity_range),
            rescaled: scaled.rescaled,
        },
    })
}
