//! Volume and mask containers
//!
//! Both use Fortran (column-major) ordering to match the NIfTI convention:
//! index = x + y*nx + z*nx*ny.

use crate::error::{Error, Result};

pub type Dims = (usize, usize, usize);

/// Index into 3D array (Fortran/column-major order)
#[inline(always)]
pub fn idx3d(i: usize, j: usize, k: usize, nx: usize, ny: usize) -> usize {
    i + j * nx + k * nx * ny
}

/// Row-major 4x4 identity affine
pub const IDENTITY_AFFINE: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// A 3D intensity volume with its spatial metadata
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    /// Intensities, flattened in Fortran order
    pub data: Vec<f64>,
    /// Dimensions (nx, ny, nz)
    pub dims: Dims,
    /// Voxel sizes in mm
    pub voxel_size: (f64, f64, f64),
    /// Affine transformation matrix (4x4, row-major)
    pub affine: [f64; 16],
}

impl Volume {
    pub fn new(data: Vec<f64>, dims: Dims, voxel_size: (f64, f64, f64), affine: [f64; 16]) -> Result<Self> {
        let expected = dims.0 * dims.1 * dims.2;
        if data.len() != expected {
            return Err(Error::invalid(
                "data",
                data.len(),
                format!("expected {} voxels for dims {:?}", expected, dims),
            ));
        }
        Ok(Self { data, dims, voxel_size, affine })
    }

    /// Volume of zeros with unit voxels and identity affine
    pub fn zeros(dims: Dims) -> Self {
        Self {
            data: vec![0.0; dims.0 * dims.1 * dims.2],
            dims,
            voxel_size: (1.0, 1.0, 1.0),
            affine: IDENTITY_AFFINE,
        }
    }

    /// New volume sharing this one's geometry but holding `data`
    pub fn with_data(&self, data: Vec<f64>) -> Result<Self> {
        Self::new(data, self.dims, self.voxel_size, self.affine)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[idx3d(i, j, k, self.dims.0, self.dims.1)]
    }

    pub fn max(&self) -> f64 {
        self.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Strictly positive intensities, in storage order
    pub fn positive_values(&self) -> Vec<f64> {
        self.data.iter().cloned().filter(|&v| v > 0.0).collect()
    }
}

/// Binary mask over a volume grid (1 = inside, 0 = outside)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub data: Vec<u8>,
    pub dims: Dims,
}

impl Mask {
    pub fn empty(dims: Dims) -> Self {
        Self { data: vec![0u8; dims.0 * dims.1 * dims.2], dims }
    }

    pub fn from_fn(dims: Dims, mut f: impl FnMut(usize) -> bool) -> Self {
        let n = dims.0 * dims.1 * dims.2;
        Self { data: (0..n).map(|i| f(i) as u8).collect(), dims }
    }

    /// Voxels strictly above `threshold`
    pub fn above(volume: &Volume, threshold: f64) -> Self {
        Self::from_fn(volume.dims, |i| volume.data[i] > threshold)
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&m| m != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&m| m == 0)
    }

    pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        self.data[idx3d(i, j, k, self.dims.0, self.dims.1)] != 0
    }

    /// Fail unless this mask was derived from a grid of `dims`
    pub fn check_shape(&self, dims: Dims) -> Result<()> {
        if self.dims != dims || self.data.len() != dims.0 * dims.1 * dims.2 {
            return Err(Error::ShapeMismatch { expected: dims, actual: self.dims });
        }
        Ok(())
    }

    pub fn intersect(&self, other: &Mask) -> Result<Mask> {
        other.check_shape(self.dims)?;
        let data = self.data.iter().zip(&other.data)
            .map(|(&a, &b)| (a != 0 && b != 0) as u8)
            .collect();
        Ok(Mask { data, dims: self.dims })
    }

    /// Voxels in `self` but not in `other`
    pub fn difference(&self, other: &Mask) -> Result<Mask> {
        other.check_shape(self.dims)?;
        let data = self.data.iter().zip(&other.data)
            .map(|(&a, &b)| (a != 0 && b == 0) as u8)
            .collect();
        Ok(Mask { data, dims: self.dims })
    }

    /// Flat indices of the voxels inside the mask, in storage order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.data.iter().enumerate().filter(|(_, &m)| m != 0).map(|(i, _)| i)
    }

    pub fn to_f64(&self) -> Vec<f64> {
        self.data.iter().map(|&m| m as f64).collect()
    }
}
