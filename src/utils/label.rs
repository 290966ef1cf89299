//! Connected-component labeling
//!
//! Face (6-) connectivity, flood-filled breadth-first. Labels start at 1 and
//! follow the first voxel of each component in row-major `(i, j, k)` order,
//! with `i` varying slowest, so ties break toward the smallest `(i, j, k)`.

use std::collections::VecDeque;

use crate::volume::{idx3d, Mask};

const NEIGHBOR_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Label map plus the voxel count of every label
#[derive(Clone, Debug)]
pub struct Labeling {
    /// 0 = background, 1..=num_labels otherwise
    pub labels: Vec<u32>,
    /// `sizes[l - 1]` is the voxel count of label `l`
    pub sizes: Vec<usize>,
}

impl Labeling {
    pub fn num_labels(&self) -> usize {
        self.sizes.len()
    }

    /// Label of the biggest component, lowest label on ties
    pub fn largest(&self) -> Option<u32> {
        let mut best: Option<(usize, usize)> = None;
        for (l, &size) in self.sizes.iter().enumerate() {
            if best.map_or(true, |(_, s)| size > s) {
                best = Some((l, size));
            }
        }
        best.map(|(l, _)| l as u32 + 1)
    }
}

/// Label the connected components of `mask`
pub fn label_components(mask: &Mask) -> Labeling {
    let (nx, ny, nz) = mask.dims;
    let mut labels = vec![0u32; mask.data.len()];
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();

    // seeds in row-major order, independent of the Fortran storage layout
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let start = idx3d(i, j, k, nx, ny);
                if mask.data[start] == 0 || labels[start] != 0 {
                    continue;
                }

                let label = sizes.len() as u32 + 1;
                let mut size = 0usize;
                labels[start] = label;
                queue.push_back((i, j, k));

                while let Some((ci, cj, ck)) = queue.pop_front() {
                    size += 1;
                    for &(di, dj, dk) in &NEIGHBOR_OFFSETS {
                        let ni = ci as i32 + di;
                        let nj = cj as i32 + dj;
                        let nk = ck as i32 + dk;
                        if ni < 0 || ni >= nx as i32 || nj < 0 || nj >= ny as i32 || nk < 0 || nk >= nz as i32 {
                            continue;
                        }
                        let (ni, nj, nk) = (ni as usize, nj as usize, nk as usize);
                        let n = idx3d(ni, nj, nk, nx, ny);
                        if mask.data[n] != 0 && labels[n] == 0 {
                            labels[n] = label;
                            queue.push_back((ni, nj, nk));
                        }
                    }
                }

                sizes.push(size);
            }
        }
    }

    Labeling { labels, sizes }
}

/// Keep only the largest connected component of `mask`.
///
/// An empty mask stays empty.
pub fn largest_component(mask: &Mask) -> Mask {
    let labeling = label_components(mask);
    match labeling.largest() {
        Some(keep) => Mask {
            data: labeling.labels.iter().map(|&l| (l == keep) as u8).collect(),
            dims: mask.dims,
        },
        None => Mask::empty(mask.dims),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(mask: &mut Mask, i: usize, j: usize, k: usize) {
        let (nx, ny, _) = mask.dims;
        mask.data[idx3d(i, j, k, nx, ny)] = 1;
    }

    #[test]
    fn test_two_components() {
        let mut mask = Mask::empty((6, 6, 6));
        // 2x2x2 block
        for k in 0..2 { for j in 0..2 { for i in 0..2 { set(&mut mask, i, j, k); } } }
        // 3-voxel line
        for i in 3..6 { set(&mut mask, i, 5, 5); }

        let labeling = label_components(&mask);
        assert_eq!(labeling.num_labels(), 2);
        assert_eq!(labeling.sizes, vec![8, 3]);
        assert_eq!(labeling.largest(), Some(1));

        let largest = largest_component(&mask);
        assert_eq!(largest.count(), 8);
        assert!(!largest.contains(4, 5, 5));
    }

    #[test]
    fn test_diagonal_voxels_are_separate() {
        let mut mask = Mask::empty((3, 3, 3));
        set(&mut mask, 0, 0, 0);
        set(&mut mask, 1, 1, 1);
        assert_eq!(label_components(&mask).num_labels(), 2);
    }

    #[test]
    fn test_tie_keeps_first_label() {
        let mut mask = Mask::empty((5, 1, 1));
        set(&mut mask, 0, 0, 0);
        set(&mut mask, 4, 0, 0);
        let largest = largest_component(&mask);
        assert!(largest.contains(0, 0, 0));
        assert!(!largest.contains(4, 0, 0));
    }

    #[test]
    fn test_tie_follows_row_major_order() {
        // Fortran storage reaches (2, 0, 0) first; row-major reaches (0, 2, 2) first
        let mut mask = Mask::empty((3, 3, 3));
        set(&mut mask, 0, 2, 2);
        set(&mut mask, 2, 0, 0);

        let labeling = label_components(&mask);
        assert_eq!(labeling.labels[idx3d(0, 2, 2, 3, 3)], 1);
        assert_eq!(labeling.labels[idx3d(2, 0, 0, 3, 3)], 2);

        let largest = largest_component(&mask);
        assert!(largest.contains(0, 2, 2));
        assert!(!largest.contains(2, 0, 0));
    }

    #[test]
    fn test_tie_between_blocks() {
        let mut mask = Mask::empty((6, 6, 6));
        // same size, the first differs only in i
        for k in 4..6 { for j in 0..2 { set(&mut mask, 1, j, k); } }
        for k in 0..2 { for j in 4..6 { set(&mut mask, 4, j, k); } }

        let largest = largest_component(&mask);
        assert_eq!(largest.count(), 4);
        assert!(largest.contains(1, 0, 4));
        assert!(!largest.contains(4, 4, 0));
    }

    #[test]
    fn test_empty_mask() {
        let mask = Mask::empty((4, 4, 4));
        assert_eq!(label_components(&mask).largest(), None);
        assert!(largest_component(&mask).is_empty());
    }
}
