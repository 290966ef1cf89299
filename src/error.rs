//! Error types for brain extraction and enhancement

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for enhancement operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("NIfTI error on '{}': {message}", .path.display())]
    Nifti { path: PathBuf, message: String },

    #[error("Expected at least a 3D volume, got {0}D")]
    UnsupportedDimensions(usize),

    #[error("Volume has no positive voxels: {stage} needs the {percentile}th percentile of positive intensities")]
    EmptyVolume {
        stage: &'static str,
        percentile: f64,
    },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for enhancement operations
pub type Result<T> = std::result::Result<T, Error>;
