//! Common test utilities for brain-enhance integration tests

#![allow(dead_code)]

use brain_enhance::volume::{idx3d, Volume, IDENTITY_AFFINE};
use brain_enhance::Mask;

/// Zero volume with an axis-aligned block `[lo, hi)` on every axis set to `value`
pub fn cube_volume(n: usize, lo: usize, hi: usize, value: f64) -> Volume {
    let mut vol = Volume::zeros((n, n, n));
    fill_block(&mut vol, (lo, hi), (lo, hi), (lo, hi), value);
    vol
}

/// Set every voxel of the block `[x0, x1) x [y0, y1) x [z0, z1)` to `value`
pub fn fill_block(vol: &mut Volume, x: (usize, usize), y: (usize, usize), z: (usize, usize), value: f64) {
    let (nx, ny, _) = vol.dims;
    for k in z.0..z.1 {
        for j in y.0..y.1 {
            for i in x.0..x.1 {
                vol.data[idx3d(i, j, k, nx, ny)] = value;
            }
        }
    }
}

/// Mask of the block `[lo, hi)` on every axis
pub fn cube_mask(n: usize, lo: usize, hi: usize) -> Mask {
    Mask::from_fn((n, n, n), |idx| {
        let i = idx % n;
        let j = (idx / n) % n;
        let k = idx / (n * n);
        (lo..hi).contains(&i) && (lo..hi).contains(&j) && (lo..hi).contains(&k)
    })
}

/// Small deterministic generator for reproducible noise (values in [0, 1))
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Background noise in [0, 5) with a central foreground block in [195, 205)
pub fn bimodal_volume(n: usize) -> Volume {
    let mut rng = Lcg::new(42);
    let mut vol = Volume::zeros((n, n, n));
    let (lo, hi) = (n / 4, 3 * n / 4);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let inside = (lo..hi).contains(&i) && (lo..hi).contains(&j) && (lo..hi).contains(&k);
                let v = if inside { 195.0 + 10.0 * rng.next_f64() } else { 5.0 * rng.next_f64() };
                vol.data[idx3d(i, j, k, n, n)] = v;
            }
        }
    }
    vol
}

/// Spherical "brain" with an intensity gradient, a dark fold through it,
/// and a small dim detached blob
pub fn brain_phantom(n: usize) -> Volume {
    let mut vol = Volume::zeros((n, n, n));
    vol.voxel_size = (1.2, 1.2, 1.5);
    vol.affine = [
        1.2, 0.0, 0.0, -14.0,
        0.0, 1.2, 0.0, -16.0,
        0.0, 0.0, 1.5, -20.0,
        0.0, 0.0, 0.0, 1.0,
    ];
    let c = n as f64 / 2.0;
    let radius = n as f64 / 3.0;
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let (dx, dy, dz) = (i as f64 - c, j as f64 - c, k as f64 - c);
                if dx * dx + dy * dy + dz * dz <= radius * radius {
                    let mut v = 80.0 + 40.0 * i as f64 / n as f64;
                    if j == n / 2 && dz.abs() < radius / 2.0 {
                        v = 35.0;
                    }
                    vol.data[idx3d(i, j, k, n, n)] = v;
                }
            }
        }
    }
    fill_block(&mut vol, (1, 3), (1, 3), (n - 3, n - 1), 50.0);
    vol
}

/// Indices where two float slices differ bitwise
pub fn bit_differences(a: &[f64], b: &[f64]) -> Vec<usize> {
    a.iter()
        .zip(b)
        .enumerate()
        .filter(|(_, (x, y))| x.to_bits() != y.to_bits())
        .map(|(i, _)| i)
        .collect()
}

/// Unique temp path for a test artifact
pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("brain_enhance_it_{}_{}", std::process::id(), name))
}

pub fn affine_close(a: &[f64; 16], b: &[f64; 16], tol: f64) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol)
}

pub fn identity() -> [f64; 16] {
    IDENTITY_AFFINE
}
