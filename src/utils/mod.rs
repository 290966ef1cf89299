//! Volume processing utilities
//!
//! - Intensity statistics (percentiles, histograms, interpolation)
//! - Threshold estimation (Otsu, percentile, adaptive)
//! - Binary morphology with box structuring elements
//! - Connected-component labeling
//! - Median filtering

pub mod stats;
pub mod threshold;
pub mod morphology;
pub mod label;
pub mod median;

pub use stats::{percentile, Histogram};
pub use threshold::{estimate_threshold, otsu_threshold, ThresholdMethod};
pub use morphology::{closing, dilate, erode, opening, BoxElement};
pub use label::{label_components, largest_component, Labeling};
pub use median::median_filter_3d;
