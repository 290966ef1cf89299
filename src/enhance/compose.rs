//! Output volume assembly

use crate::enhance::config::BoundaryMode;
use crate::error::{Error, Result};
use crate::utils::morphology::{dilate, BoxElement};
use crate::volume::{Dims, Mask};

/// Fraction of the denoised signal kept in the soft-blend ring
pub const SOFT_BLEND_FACTOR: f64 = 0.2;

const RING_ELEMENT: BoxElement = BoxElement::new(2);

/// Scatter `values` into a zero volume at the mask's voxels.
///
/// In [`BoundaryMode::SoftBlend`] the one-voxel ring just outside the mask
/// (one 2x2x2 dilation) receives `0.2 * denoised`; the mask interior is never
/// touched by the ring.
pub fn compose(
    dims: Dims,
    mask: &Mask,
    values: &[f64],
    denoised: &[f64],
    boundary_mode: BoundaryMode,
) -> Result<Vec<f64>> {
    mask.check_shape(dims)?;
    let n = dims.0 * dims.1 * dims.2;
    let selected = mask.count();
    if values.len() != selected {
        return Err(Error::invalid("values", values.len(), format!("mask selects {} voxels", selected)));
    }
    if boundary_mode == BoundaryMode::SoftBlend && denoised.len() != n {
        return Err(Error::invalid("denoised", denoised.len(), format!("expected {} voxels", n)));
    }

    let mut output = vec![0.0f64; n];
    for (idx, &v) in mask.indices().zip(values) {
        output[idx] = v;
    }

    if boundary_mode == BoundaryMode::SoftBlend && selected > 0 {
        let ring = dilate(mask, RING_ELEMENT, 1).difference(mask)?;
        for idx in ring.indices() {
            output[idx] = denoised[idx] * SOFT_BLEND_FACTOR;
        }
    }

    Ok(output)
}
