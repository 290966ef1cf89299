//! Brain-Enhance: brain extraction and contrast enhancement for 3D MRI
//!
//! Takes a skull-stripped, registered, bias-corrected T1 volume and produces
//! an enhanced volume where brain tissue is rescaled into a fixed range and
//! everything else is exactly zero.
//!
//! # Modules
//! - `volume`: volume and mask containers (Fortran order, NIfTI convention)
//! - `utils`: statistics, thresholding, morphology, labeling, median filter
//! - `enhance`: mask building, normalization, equalization, batch runs
//! - `nifti_io`: NIfTI-1 reading and writing

pub mod error;
pub mod volume;

// Algorithm modules
pub mod utils;
pub mod enhance;

// I/O modules
pub mod nifti_io;

pub use error::{Error, Result};
pub use volume::{Mask, Volume};
pub use enhance::{enhance, run_batch, BoundaryMode, EnhanceConfig, OutputNaming};
pub use utils::ThresholdMethod;
