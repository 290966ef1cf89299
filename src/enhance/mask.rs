//! Brain mask construction and refinement
//!
//! Building:
//! 1. Threshold (strictly greater than)
//! 2. Closing with a 3x3x3 box to fill small holes
//! 3. Opening with a 2x2x2 box to drop isolated noise voxels
//! 4. Keep the largest connected component
//! 5. Dilate twice with a 3x3x3 box to recover thin cortical edges
//!
//! Refinement strips the membrane-like shell left around percentile and Otsu
//! masks: erode (2x2x2), dilate (3x3x3), intersect with the voxels above the
//! 10th percentile of positive intensities, and keep the largest component.

use tracing::debug;

use crate::error::{Error, Result};
use crate::utils::label::largest_component;
use crate::utils::morphology::{closing, dilate, erode, opening, BoxElement};
use crate::utils::stats::percentile;
use crate::utils::threshold::{estimate_threshold, ThresholdMethod};
use crate::volume::{Mask, Volume};

const CLOSE_ELEMENT: BoxElement = BoxElement::new(3);
const OPEN_ELEMENT: BoxElement = BoxElement::new(2);
const GROW_ELEMENT: BoxElement = BoxElement::new(3);
const GROW_ITERATIONS: usize = 2;

const REFINE_ERODE_ELEMENT: BoxElement = BoxElement::new(2);
const REFINE_DILATE_ELEMENT: BoxElement = BoxElement::new(3);

/// Percentile of positive intensities a refined voxel must exceed
pub const REFINE_INTENSITY_PERCENTILE: f64 = 10.0;

/// Threshold, clean up, and select the main connected component.
///
/// Returns the mask before the final edge-recovery dilation. It has at most
/// one connected component.
pub fn core_mask(volume: &Volume, threshold: f64) -> Mask {
    let initial = Mask::above(volume, threshold);
    let closed = closing(&initial, CLOSE_ELEMENT);
    let opened = opening(&closed, OPEN_ELEMENT);
    let largest = largest_component(&opened);
    debug!(
        initial = initial.count(),
        closed = closed.count(),
        opened = opened.count(),
        largest = largest.count(),
        "mask cleanup"
    );
    largest
}

/// Build the brain mask of `volume` for a given threshold.
///
/// The final dilation can merge the main component with margins of regions
/// dropped earlier.
pub fn build_mask(volume: &Volume, threshold: f64) -> Mask {
    let core = core_mask(volume, threshold);
    if core.is_empty() {
        return core;
    }
    dilate(&core, GROW_ELEMENT, GROW_ITERATIONS)
}

/// Estimate the threshold with `method` and build the mask from it
pub fn build_brain_mask(volume: &Volume, method: ThresholdMethod) -> Result<(Mask, f64)> {
    let threshold = estimate_threshold(volume, method)?;
    Ok((build_mask(volume, threshold), threshold))
}

/// Tighten `mask` against the intensities of `volume`.
///
/// Fails with [`Error::EmptyVolume`] when `volume` has no positive voxels.
pub fn refine_mask(mask: &Mask, volume: &Volume) -> Result<Mask> {
    mask.check_shape(volume.dims)?;

    let intensity_floor = percentile(&volume.positive_values(), REFINE_INTENSITY_PERCENTILE)
        .ok_or(Error::EmptyVolume {
            stage: "mask refinement",
            percentile: REFINE_INTENSITY_PERCENTILE,
        })?;

    let eroded = erode(mask, REFINE_ERODE_ELEMENT, 1);
    let regrown = dilate(&eroded, REFINE_DILATE_ELEMENT, 1);
    let bright = Mask::above(volume, intensity_floor);
    let kept = regrown.intersect(&bright)?;
    let refined = largest_component(&kept);

    debug!(
        intensity_floor,
        eroded = eroded.count(),
        regrown = regrown.count(),
        bright = kept.count(),
        refined = refined.count(),
        "mask refinement"
    );
    Ok(refined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{idx3d, IDENTITY_AFFINE};

    fn volume_with_blocks(dims: (usize, usize, usize), blocks: &[((usize, usize), (usize, usize), (usize, usize), f64)]) -> Volume {
        let (nx, ny, nz) = dims;
        let mut data = vec![0.0; nx * ny * nz];
        for &((x0, x1), (y0, y1), (z0, z1), v) in blocks {
            for k in z0..z1 {
                for j in y0..y1 {
                    for i in x0..x1 {
                        data[idx3d(i, j, k, nx, ny)] = v;
                    }
                }
            }
        }
        Volume::new(data, dims, (1.0, 1.0, 1.0), IDENTITY_AFFINE).unwrap()
    }

    #[test]
    fn test_core_mask_keeps_larger_region() {
        // 5x5x5 block (125) and a 3x3x3 block (27), well separated
        let vol = volume_with_blocks((20, 12, 12), &[
            ((2, 7), (3, 8), (3, 8), 100.0),
            ((13, 16), (4, 7), (4, 7), 100.0),
        ]);
        let core = core_mask(&vol, 50.0);
        assert_eq!(core.count(), 125);
        assert!(core.contains(4, 5, 5));
        assert!(!core.contains(14, 5, 5));
    }

    #[test]
    fn test_build_mask_dilates_twice() {
        let vol = volume_with_blocks((12, 12, 12), &[((4, 8), (4, 8), (4, 8), 100.0)]);
        let mask = build_mask(&vol, 50.0);
        assert_eq!(mask.count(), 8 * 8 * 8);
    }

    #[test]
    fn test_all_zero_volume_gives_empty_mask() {
        let vol = Volume::zeros((8, 8, 8));
        for method in [ThresholdMethod::Otsu, ThresholdMethod::Adaptive] {
            let (mask, threshold) = build_brain_mask(&vol, method).unwrap();
            assert_eq!(threshold, 0.0);
            assert!(mask.is_empty(), "{} mask should be empty", method);
        }
        assert!(matches!(
            build_brain_mask(&vol, ThresholdMethod::Percentile),
            Err(Error::EmptyVolume { .. })
        ));
    }

    #[test]
    fn test_refine_drops_dim_shell() {
        // Bright core with a dim shell around it
        let vol = volume_with_blocks((14, 14, 14), &[
            ((3, 11), (3, 11), (3, 11), 10.0),
            ((5, 9), (5, 9), (5, 9), 200.0),
        ]);
        let mask = build_mask(&vol, 5.0);
        let refined = refine_mask(&mask, &vol).unwrap();
        // 10th percentile of positives is 10, so only the bright core survives
        assert_eq!(refined.count(), 64);
        assert!(refined.contains(6, 6, 6));
        assert!(!refined.contains(3, 3, 3));
    }

    #[test]
    fn test_refine_empty_volume_fails() {
        let vol = Volume::zeros((6, 6, 6));
        let mask = Mask::empty((6, 6, 6));
        assert!(matches!(refine_mask(&mask, &vol), Err(Error::EmptyVolume { .. })));
    }

    #[test]
    fn test_refine_shape_mismatch() {
        let vol = Volume::zeros((6, 6, 6));
        let mask = Mask::empty((6, 6, 5));
        assert!(matches!(refine_mask(&mask, &vol), Err(Error::ShapeMismatch { .. })));
    }
}
