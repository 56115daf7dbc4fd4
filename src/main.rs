//! `mkspl`: precompute cross-section splines for a set of probes and targets.
//!
//! ```text
//! mkspl -p 14,-14 -t 1000260560 -n 40 -e 100 -o xsec_splines.json
//! mkspl -p 14 -f detector.toml --input previous.json --load-policy requested
//! ```
//!
//! Exit status: 1 configuration or argument error, 2 empty probe list,
//! 3 empty target list, 4 one or more splines failed to build.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use xsec_splines::algorithm::AlgorithmRegistry;
use xsec_splines::config::{load_layers, ConfigStore, LoadPolicyKind};
use xsec_splines::driver::{Driver, GeometrySource, MaterialFile, RunRequest};
use xsec_splines::interaction::Pdg;
use xsec_splines::observability::{logging, metrics};
use xsec_splines::spline::SplineCache;

const EXIT_CONFIG: u8 = 1;
const EXIT_BUILD_FAILED: u8 = 4;

#[derive(Parser)]
#[command(name = "mkspl")]
#[command(about = "Precompute cross-section splines", long_about = None)]
struct Cli {
    /// Probe codes, comma separated (e.g. 14,-14)
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    probes: Vec<Pdg>,

    /// Target codes, comma separated (e.g. 1000260560,1000080160)
    #[arg(short, long, value_delimiter = ',')]
    targets: Vec<Pdg>,

    /// Geometry material file to take the targets from
    #[arg(short = 'f', long)]
    geometry: Option<PathBuf>,

    /// Output spline table
    #[arg(short, long, default_value = "xsec_splines.json")]
    output: PathBuf,

    /// Knots per spline (never below the configured minimum)
    #[arg(short = 'n', long)]
    knots: Option<usize>,

    /// Maximum energy in GeV
    #[arg(short = 'e', long)]
    max_energy: Option<f64>,

    /// Extra configuration layers, applied in order
    #[arg(short, long)]
    config: Vec<PathBuf>,

    /// Spline table to preload
    #[arg(long)]
    input: Option<PathBuf>,

    /// Which preloaded splines to keep
    #[arg(long, value_enum)]
    load_policy: Option<LoadPolicyArg>,

    /// Concurrent spline builds
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LoadPolicyArg {
    All,
    Requested,
}

impl From<LoadPolicyArg> for LoadPolicyKind {
    fn from(arg: LoadPolicyArg) -> Self {
        match arg {
            LoadPolicyArg::All => LoadPolicyKind::All,
            LoadPolicyArg::Requested => LoadPolicyKind::Requested,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let mut config = match load_layers(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mkspl: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    if let Some(workers) = cli.workers {
        config.driver.workers = workers;
    }
    if let Some(policy) = cli.load_policy {
        config.splines.load_policy = policy.into();
    }

    logging::init_logging(&config.observability);
    tracing::info!(
        layers = cli.config.len(),
        generators = config.driver.generators.len(),
        workers = config.driver.workers,
        knots_per_decade = config.splines.knots_per_decade,
        min_knots = config.splines.min_knots,
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        metrics::init_metrics()
    } else {
        None
    };

    let store = Arc::new(ConfigStore::from_entries(config.algorithms.clone()));
    let registry = AlgorithmRegistry::with_builtins(store);
    let cache = Arc::new(SplineCache::new(config.splines));
    let mut driver = Driver::new(registry, cache, &config.driver);

    let request = RunRequest {
        probes: cli.probes,
        targets: cli.targets,
        geometry: cli
            .geometry
            .map(|path| Arc::new(MaterialFile::new(path)) as Arc<dyn GeometrySource>),
        knots: cli.knots,
        max_energy: cli.max_energy,
        output: cli.output,
        input: cli.input,
    };

    let result = driver.run(&request).await;

    if let (Some(handle), Some(path)) = (&metrics_handle, &config.observability.metrics_output) {
        if let Err(e) = metrics::write_snapshot(handle, Path::new(path)) {
            tracing::warn!(error = %e, path = %path, "Failed to write metrics");
        }
    }

    match result {
        Ok(report) if report.is_success() => {
            println!(
                "{} splines written to {} ({} built, {} reused)",
                report.saved,
                request.output.display(),
                report.built,
                report.reused
            );
            ExitCode::SUCCESS
        }
        Ok(report) => {
            for failure in &report.failures {
                eprintln!("failed: {} ({}): {}", failure.process, failure.algorithm, failure.reason);
            }
            eprintln!(
                "{} of {} splines failed; table written to {}",
                report.failures.len(),
                report.planned,
                request.output.display()
            );
            ExitCode::from(EXIT_BUILD_FAILED)
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            eprintln!("mkspl: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
