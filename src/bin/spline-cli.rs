use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

use xsec_splines::config::SplineSettings;
use xsec_splines::interaction::{Pdg, ProcessKey};
use xsec_splines::spline::{CachedSpline, LoadPolicy, SplineCache};

#[derive(Parser)]
#[command(name = "spline-cli")]
#[command(about = "Inspect a saved cross-section spline table", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "xsec_splines.json")]
    table: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every spline in the table
    List,
    /// Evaluate splines at one energy
    Eval {
        /// Energy in GeV
        #[arg(short, long)]
        energy: f64,
        #[arg(long, allow_hyphen_values = true)]
        probe: Option<Pdg>,
        #[arg(long)]
        target: Option<Pdg>,
        /// Process label, e.g. CC-DIS
        #[arg(long)]
        process: Option<String>,
    },
    /// Counts per probe, target and algorithm
    Summary,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cache = SplineCache::new(SplineSettings::default());
    cache.load_all(&cli.table, &LoadPolicy::All)?;
    let entries = cache.entries();

    let output = match cli.command {
        Commands::List => Value::Array(entries.iter().map(describe).collect()),
        Commands::Eval {
            energy,
            probe,
            target,
            process,
        } => {
            let rows = entries
                .iter()
                .filter(|(key, _)| probe.map_or(true, |p| key.probe == p))
                .filter(|(key, _)| target.map_or(true, |t| key.target == t))
                .filter(|(key, _)| {
                    process
                        .as_deref()
                        .map_or(true, |p| key.process.to_string().starts_with(p))
                })
                .map(|(key, cached)| {
                    json!({
                        "process": key.to_string(),
                        "algorithm": cached.algorithm.to_string(),
                        "energy": energy,
                        "xsec": cached.spline.evaluate(energy),
                    })
                })
                .collect();
            Value::Array(rows)
        }
        Commands::Summary => summary(&entries),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn describe((key, cached): &(ProcessKey, CachedSpline)) -> Value {
    json!({
        "process": key.to_string(),
        "algorithm": cached.algorithm.to_string(),
        "knots": cached.spline.len(),
        "e_min": cached.spline.min_energy(),
        "e_max": cached.spline.max_energy(),
    })
}

fn summary(entries: &[(ProcessKey, CachedSpline)]) -> Value {
    let mut probes = serde_json::Map::new();
    let mut targets = serde_json::Map::new();
    let mut algorithms = serde_json::Map::new();
    for (key, cached) in entries {
        bump(&mut probes, key.probe.to_string());
        bump(&mut targets, key.target.to_string());
        bump(&mut algorithms, cached.algorithm.to_string());
    }
    json!({
        "splines": entries.len(),
        "knots": entries.iter().map(|(_, c)| c.spline.len()).sum::<usize>(),
        "probes": probes,
        "targets": targets,
        "algorithms": algorithms,
    })
}

fn bump(counts: &mut serde_json::Map<String, Value>, key: String) {
    let count = counts.get(&key).and_then(Value::as_u64).unwrap_or(0);
    counts.insert(key, json!(count + 1));
}
