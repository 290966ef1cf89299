//! Median filtering
//!
//! Cubic-neighborhood median with zero padding beyond the volume edge.

use crate::volume::idx3d;

/// 3D median filter with a cubic window of `kernel_size` voxels per side.
///
/// `kernel_size` should be odd; out-of-volume neighbors count as 0. A kernel
/// of 1 (or 0) returns the input unchanged.
pub fn median_filter_3d(data: &[f64], nx: usize, ny: usize, nz: usize, kernel_size: usize) -> Vec<f64> {
    if kernel_size <= 1 {
        return data.to_vec();
    }

    let r = (kernel_size / 2) as i64;
    let window = kernel_size * kernel_size * kernel_size;
    let mut neighborhood = Vec::with_capacity(window);
    let mut result = vec![0.0f64; data.len()];

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                neighborhood.clear();
                for dz in -r..=r {
                    for dy in -r..=r {
                        for dx in -r..=r {
                            let ni = i as i64 + dx;
                            let nj = j as i64 + dy;
                            let nk = k as i64 + dz;
                            let v = if ni < 0 || ni >= nx as i64 ||
                                       nj < 0 || nj >= ny as i64 ||
                                       nk < 0 || nk >= nz as i64 {
                                0.0
                            } else {
                                data[idx3d(ni as usize, nj as usize, nk as usize, nx, ny)]
                            };
                            neighborhood.push(v);
                        }
                    }
                }
                let mid = neighborhood.len() / 2;
                let (_, median, _) = neighborhood.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
                result[idx3d(i, j, k, nx, ny)] = *median;
            }
        }
    }

    result
}
