//! Brain extraction and masked contrast enhancement
//!
//! Stages, each feeding the next:
//! - `mask`: threshold-driven brain mask and optional refinement
//! - `normalize`: median denoising and percentile rescaling of brain voxels
//! - `equalize`: blended histogram equalization
//! - `compose`: zero-background output assembly with optional soft ring
//! - `pipeline`: one configuration end to end
//! - `batch`: several named configurations against one input

pub mod config;
pub mod mask;
pub mod normalize;
pub mod equalize;
pub mod compose;
pub mod pipeline;
pub mod batch;

pub use config::{BoundaryMode, EnhanceConfig, EnhanceConfigBuilder};
pub use mask::{build_brain_mask, build_mask, core_mask, refine_mask};
pub use normalize::{normalize, Normalized, ScaledVoxels};
pub use equalize::{equalize, DEFAULT_BLEND_WEIGHT};
pub use compose::{compose, SOFT_BLEND_FACTOR};
pub use pipeline::{enhance, Enhanced, RunSummary};
pub use batch::{run_batch, run_batch_from_file, BatchFailure, BatchOutput, BatchReport, OutputNaming};
