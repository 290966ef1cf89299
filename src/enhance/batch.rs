//! Multi-configuration batch runs
//!
//! Every configuration runs against the same read-only source volume. A
//! failing configuration is logged and reported, and the rest carry on.
//! Configuration names must be unique; a repeated name is reported as a
//! failure without running, since it would overwrite the earlier output.
//! With the `parallel` feature the configurations run on the rayon pool.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::enhance::config::EnhanceConfig;
use crate::enhance::pipeline::{enhance, RunSummary};
use crate::error::{Error, Result};
use crate::nifti_io::{read_volume, write_volume};
use crate::volume::Volume;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Derives `{base}_{config}.{extension}` output paths
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputNaming {
    pub base: PathBuf,
    pub extension: String,
}

impl OutputNaming {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into(), extension: "nii.gz".to_string() }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn path_for(&self, config_name: &str) -> PathBuf {
        let mut name = self.base.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!("_{}.{}", config_name, self.extension));
        self.base.with_file_name(name)
    }
}

/// A configuration that produced an output file
#[derive(Clone, Debug)]
pub struct BatchOutput {
    pub config: String,
    pub path: PathBuf,
    pub summary: RunSummary,
}

/// A configuration that failed, with the rendered error
#[derive(Clone, Debug)]
pub struct BatchFailure {
    pub config: String,
    pub error: String,
}

/// Results of a batch, both lists in configuration order
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub outputs: Vec<BatchOutput>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn output_path(&self, config: &str) -> Option<&Path> {
        self.outputs.iter().find(|o| o.config == config).map(|o| o.path.as_path())
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn run_one(volume: &Volume, config: &EnhanceConfig, naming: &OutputNaming) -> Result<BatchOutput> {
    info!("running {}", config);
    let enhanced = enhance(volume, config)?;
    let path = naming.path_for(config.name());
    write_volume(&path, &enhanced.volume)?;
    info!(config = config.name(), path = %path.display(), "saved enhanced volume");
    Ok(BatchOutput { config: config.name().to_string(), path, summary: enhanced.summary })
}

/// Run every configuration against `volume` and write one file per success
pub fn run_batch(volume: &Volume, configs: &[EnhanceConfig], naming: &OutputNaming) -> BatchReport {
    let mut seen = HashSet::new();
    let repeated: Vec<bool> = configs.iter().map(|c| !seen.insert(c.name())).collect();
    let run = |(n, config): (usize, &EnhanceConfig)| {
        if repeated[n] {
            return Err(Error::invalid("config", config.name(), "duplicate configuration name"));
        }
        run_one(volume, config, naming)
    };

    #[cfg(feature = "parallel")]
    let results: Vec<Result<BatchOutput>> = configs.par_iter().enumerate().map(run).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<BatchOutput>> = configs.iter().enumerate().map(run).collect();

    let mut report = BatchReport::default();
    for (config, result) in configs.iter().zip(results) {
        match result {
            Ok(output) => report.outputs.push(output),
            Err(e) => {
                error!(config = config.name(), "configuration failed: {}", e);
                report.failures.push(BatchFailure { config: config.name().to_string(), error: e.to_string() });
            }
        }
    }
    report
}

/// Load `input` once and run the batch on it
pub fn run_batch_from_file(input: &Path, configs: &[EnhanceConfig], naming: &OutputNaming) -> Result<BatchReport> {
    let volume = read_volume(input)?;
    let (min, max) = volume.data.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    info!(dims = ?volume.dims, min, max, path = %input.display(), "loaded input volume");
    Ok(run_batch(&volume, configs, naming))
}
