//! `risk-quant` - run the FAIR loss simulation from the command line
//!
//! ```bash
//! risk-quant simulate --params estimate.json --trials 50000 --seed 7
//! risk-quant curve --params estimate.json --points 100 > curve.csv
//! risk-quant validate --params estimate.json
//! ```

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use risk_quant_core_rs::quant::{exceedance_curve, ResolvedFactors, SimulationRun};
use risk_quant_core_rs::{FairEstimate, LossSummary, QuantConfig, SimulationRunner};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

use logging::{init_logging, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "risk-quant")]
#[command(about = "FAIR Monte Carlo risk quantification")]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    log_format: LogFormat,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation and print a loss summary as JSON
    Simulate {
        #[command(flatten)]
        run: RunArgs,

        /// Also write every trial's loss to this file (JSON array)
        #[arg(long)]
        losses_out: Option<PathBuf>,
    },

    /// Run the simulation and print the exceedance curve as CSV
    Curve {
        #[command(flatten)]
        run: RunArgs,

        /// Maximum number of curve points (0 keeps every trial)
        #[arg(long)]
        points: Option<usize>,
    },

    /// Check a parameter file without simulating
    Validate {
        /// FAIR parameters JSON file ("-" for stdin)
        #[arg(short, long)]
        params: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// FAIR parameters JSON file ("-" for stdin)
    #[arg(short, long)]
    params: PathBuf,

    /// Engine config JSON file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of trials
    #[arg(long)]
    trials: Option<usize>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Run trials on all cores
    #[arg(long)]
    parallel: bool,
}

impl RunArgs {
    fn config(&self) -> Result<QuantConfig> {
        let mut config = match &self.config {
            Some(path) => QuantConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => QuantConfig::default(),
        };

        if let Some(trials) = self.trials {
            config = config.with_trials(trials);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.parallel {
            config = config.with_parallel(true);
        }
        Ok(config)
    }

    fn simulate(&self) -> Result<(QuantConfig, SimulationRun)> {
        let config = self.config()?;
        let estimate = read_estimate(&self.params)?;
        let run = SimulationRunner::new(config.clone())
            .run(&estimate.parameters)
            .context("simulation rejected the parameters")?;
        Ok((config, run))
    }
}

fn read_estimate(path: &Path) -> Result<FairEstimate> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading parameters from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading parameters {}", path.display()))?
    };

    FairEstimate::from_json_str(&text)
        .with_context(|| format!("parsing parameters {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig {
        format: cli.log_format,
        level: cli.log_level.clone(),
    })?;

    match cli.command {
        Commands::Simulate { run, losses_out } => {
            let (_, result) = run.simulate()?;
            if result.distribution.is_empty() {
                bail!("trial count is zero; nothing to summarize");
            }

            let summary = LossSummary::from_distribution(&result.distribution)?;
            let substituted: Vec<&str> = result.substituted.iter().map(|f| f.key()).collect();
            let output = json!({
                "rng_seed": result.rng_seed,
                "substituted_factors": substituted,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);

            if let Some(path) = losses_out {
                let body = serde_json::to_string(&result.distribution)?;
                std::fs::write(&path, body)
                    .with_context(|| format!("writing losses to {}", path.display()))?;
                info!(path = %path.display(), trials = result.distribution.len(), "losses written");
            }
        }

        Commands::Curve { run, points } => {
            let (config, result) = run.simulate()?;
            let curve = exceedance_curve(&result.distribution)
                .context("no simulation results to plot")?;
            let max_points = points.unwrap_or(config.curve_points);
            let curve = if max_points == 0 {
                curve
            } else {
                curve.downsample(max_points)
            };

            println!("loss,probability");
            for point in curve.points() {
                println!("{},{}", point.loss, point.probability);
            }
        }

        Commands::Validate { params } => {
            let estimate = read_estimate(&params)?;
            let factors = ResolvedFactors::resolve(&estimate.parameters)
                .context("parameters are invalid")?;

            if factors.substituted.is_empty() {
                println!("ok: all four factors present");
            } else {
                let missing: Vec<&str> = factors.substituted.iter().map(|f| f.key()).collect();
                println!(
                    "ok: missing factors will be sampled as zero: {}",
                    missing.join(", ")
                );
            }
        }
    }

    Ok(())
}
