//! brain-enhance: run named enhancement configurations on one NIfTI volume
//!
//! Usage: brain-enhance PPMI_3612_brain_registered_n4.nii.gz --output-base PPMI_3612_enhanced

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use brain_enhance::enhance::batch::run_batch_from_file;
use brain_enhance::{BoundaryMode, EnhanceConfig, OutputNaming, ThresholdMethod};

#[derive(Parser, Debug)]
#[command(name = "brain-enhance", version, about = "Brain mask extraction and masked contrast enhancement")]
struct Cli {
    /// Input volume (.nii or .nii.gz)
    input: PathBuf,

    /// Output base path; files are written as {base}_{config}.{ext}
    #[arg(short, long)]
    output_base: Option<PathBuf>,

    /// Output extension
    #[arg(long, default_value = "nii.gz")]
    extension: String,

    /// Configuration as NAME:METHOD[:refine][:soft]; repeatable.
    /// Without any, the adaptive_black, percentile_refined and otsu_refined set runs.
    #[arg(short, long = "config", value_name = "SPEC")]
    configs: Vec<String>,

    /// Median filter window (odd)
    #[arg(long, default_value_t = 3)]
    kernel_size: usize,

    /// Lower clipping percentile
    #[arg(long, default_value_t = 1.0)]
    low_percentile: f64,

    /// Upper clipping percentile
    #[arg(long, default_value_t = 99.0)]
    high_percentile: f64,

    /// Output bins; values land in [0, bins - 1]
    #[arg(long, default_value_t = 256)]
    bins: usize,

    /// Skip histogram equalization
    #[arg(long)]
    no_equalize: bool,

    /// Weight of the equalized values in the blend
    #[arg(long, default_value_t = 0.7)]
    blend_weight: f64,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn default_base(&self) -> PathBuf {
        let name = self.input.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let stem = name.trim_end_matches(".gz").trim_end_matches(".nii");
        self.input.with_file_name(format!("{}_enhanced", stem))
    }

    fn build_configs(&self) -> brain_enhance::Result<Vec<EnhanceConfig>> {
        let shared = |name: &str, method: ThresholdMethod, refine: bool, mode: BoundaryMode| {
            EnhanceConfig::builder(name)
                .method(method)
                .refine_mask(refine)
                .boundary_mode(mode)
                .kernel_size(self.kernel_size)
                .percentiles(self.low_percentile, self.high_percentile)
                .bin_count(self.bins)
                .equalize(!self.no_equalize)
                .blend_weight(self.blend_weight)
                .build()
        };

        if self.configs.is_empty() {
            return EnhanceConfig::standard_set()
                .iter()
                .map(|c| shared(c.name(), c.method(), c.refine_mask(), c.boundary_mode()))
                .collect();
        }

        self.configs
            .iter()
            .map(|spec| {
                let mut parts = spec.split(':');
                let name = parts.next().unwrap_or_default();
                let method: ThresholdMethod = parts.next().unwrap_or("adaptive").parse()?;
                let mut refine = false;
                let mut mode = BoundaryMode::StrictBlack;
                for flag in parts {
                    match flag {
                        "refine" => refine = true,
                        other => mode = other.parse()?,
                    }
                }
                shared(name, method, refine, mode)
            })
            .collect()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to install log subscriber");
    }

    let configs = match cli.build_configs() {
        Ok(configs) => configs,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let base = cli.output_base.clone().unwrap_or_else(|| cli.default_base());
    let naming = OutputNaming::new(base).with_extension(cli.extension.clone());

    let report = match run_batch_from_file(&cli.input, &configs, &naming) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("produced {} of {} outputs", report.outputs.len(), configs.len());
    for output in &report.outputs {
        println!("  {}: {}", output.config, output.path.display());
    }
    for failure in &report.failures {
        println!("  {}: FAILED ({})", failure.config, failure.error);
    }

    if report.outputs.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
