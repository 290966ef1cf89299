//! Binary morphology with cubic (box) structuring elements
//!
//! A box of side `size` is anchored the way ndimage anchors it: erosion looks
//! at offsets `-(size/2) ..= size-1-size/2` along every axis, and dilation uses
//! the reflected element. For odd sizes this is the usual centered cube; for
//! a 2x2x2 box erosion reads the voxel behind and dilation the voxel ahead,
//! so an opening with it is still a proper opening.
//!
//! Voxels beyond the volume edge count as background for both operations.
//! Box elements are separable, so each operation runs as three 1D passes.

use crate::volume::{idx3d, Dims, Mask};

/// Cubic structuring element of `size` voxels per side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxElement {
    pub size: usize,
}

impl BoxElement {
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Offset range along one axis used by erosion
    fn erosion_span(&self) -> (isize, isize) {
        let size = self.size.max(1) as isize;
        let lo = -(size / 2);
        (lo, lo + size - 1)
    }

    /// Offset range along one axis used by dilation (reflected element)
    fn dilation_span(&self) -> (isize, isize) {
        let (lo, hi) = self.erosion_span();
        (-hi, -lo)
    }
}

/// Erode `mask` with a box element, `iterations` times
pub fn erode(mask: &Mask, element: BoxElement, iterations: usize) -> Mask {
    let span = element.erosion_span();
    let mut data = mask.data.clone();
    for _ in 0..iterations {
        data = box_pass(&data, mask.dims, span, true);
    }
    Mask { data, dims: mask.dims }
}

/// Dilate `mask` with a box element, `iterations` times
pub fn dilate(mask: &Mask, element: BoxElement, iterations: usize) -> Mask {
    let span = element.dilation_span();
    let mut data = mask.data.clone();
    for _ in 0..iterations {
        data = box_pass(&data, mask.dims, span, false);
    }
    Mask { data, dims: mask.dims }
}

/// Morphological closing (dilation followed by erosion)
pub fn closing(mask: &Mask, element: BoxElement) -> Mask {
    erode(&dilate(mask, element, 1), element, 1)
}

/// Morphological opening (erosion followed by dilation)
pub fn opening(mask: &Mask, element: BoxElement) -> Mask {
    dilate(&erode(mask, element, 1), element, 1)
}

/// One full 3D box operation as three separable 1D passes
fn box_pass(data: &[u8], dims: Dims, span: (isize, isize), all: bool) -> Vec<u8> {
    let x = line_pass(data, dims, 0, span, all);
    let xy = line_pass(&x, dims, 1, span, all);
    line_pass(&xy, dims, 2, span, all)
}

/// 1D min (`all`) or max filter along `axis` over offsets `span`
fn line_pass(data: &[u8], dims: Dims, axis: usize, span: (isize, isize), all: bool) -> Vec<u8> {
    let (nx, ny, nz) = dims;
    let len = [nx, ny, nz][axis] as isize;
    let mut out = vec![0u8; data.len()];

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let pos = [i, j, k][axis] as isize;
                let mut hit = all;
                for o in span.0..=span.1 {
                    let p = pos + o;
                    let inside = if p < 0 || p >= len {
                        false
                    } else {
                        let mut c = [i, j, k];
                        c[axis] = p as usize;
                        data[idx3d(c[0], c[1], c[2], nx, ny)] != 0
                    };
                    if all && !inside {
                        hit = false;
                        break;
                    }
                    if !all && inside {
                        hit = true;
                        break;
                    }
                }
                out[idx3d(i, j, k, nx, ny)] = hit as u8;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_mask(dims: Dims, lo: usize, hi: usize) -> Mask {
        let (nx, ny, _) = dims;
        Mask::from_fn(dims, |idx| {
            let i = idx % nx;
            let j = (idx / nx) % ny;
            let k = idx / (nx * ny);
            (lo..hi).contains(&i) && (lo..hi).contains(&j) && (lo..hi).contains(&k)
        })
    }

    #[test]
    fn test_dilate_3x3x3_grows_cube() {
        let mask = cube_mask((10, 10, 10), 4, 6);
        let dilated = dilate(&mask, BoxElement::new(3), 1);
        assert_eq!(dilated, cube_mask((10, 10, 10), 3, 7));
        let twice = dilate(&mask, BoxElement::new(3), 2);
        assert_eq!(twice.count(), 6 * 6 * 6);
    }

    #[test]
    fn test_erode_3x3x3_shrinks_cube() {
        let mask = cube_mask((10, 10, 10), 2, 7);
        let eroded = erode(&mask, BoxElement::new(3), 1);
        assert_eq!(eroded, cube_mask((10, 10, 10), 3, 6));
    }

    #[test]
    fn test_even_element_anchoring() {
        let dims = (6, 6, 6);
        let mask = cube_mask(dims, 2, 4);
        // dilation reads the voxel ahead, so the cube grows backwards
        let dilated = dilate(&mask, BoxElement::new(2), 1);
        assert_eq!(dilated, cube_mask(dims, 1, 4));
        // erosion reads the voxel behind
        let eroded = erode(&mask, BoxElement::new(2), 1);
        assert_eq!(eroded, cube_mask(dims, 3, 4));
    }

    #[test]
    fn test_opening_removes_single_voxel() {
        let dims = (8, 8, 8);
        let mut mask = cube_mask(dims, 1, 4);
        mask.data[idx3d(6, 6, 6, 8, 8)] = 1;
        let opened = opening(&mask, BoxElement::new(2));
        assert_eq!(opened, cube_mask(dims, 1, 4));
    }

    #[test]
    fn test_closing_fills_hole() {
        let dims = (9, 9, 9);
        let mut mask = cube_mask(dims, 2, 7);
        mask.data[idx3d(4, 4, 4, 9, 9)] = 0;
        let closed = closing(&mask, BoxElement::new(3));
        assert!(closed.contains(4, 4, 4));
        assert_eq!(closed, cube_mask(dims, 2, 7));
    }

    #[test]
    fn test_erosion_treats_edge_as_background() {
        let full = Mask::from_fn((4, 4, 4), |_| true);
        let eroded = erode(&full, BoxElement::new(3), 1);
        assert_eq!(eroded, cube_mask((4, 4, 4), 1, 3));
    }

    #[test]
    fn test_empty_mask_stays_empty() {
        let mask = Mask::empty((5, 5, 5));
        assert!(dilate(&mask, BoxElement::new(3), 2).is_empty());
        assert!(closing(&mask, BoxElement::new(3)).is_empty());
    }
}
