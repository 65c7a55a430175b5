//! vfd-analyzer - Voice fraud analysis driver
//!
//! Reads each audio file into memory, runs it through the analyzer on the
//! blocking pool and prints one JSON object per file to stdout, in argument
//! order. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};
use vfd_analyzer::{Analyzer, FeatureVector, ScoreResult};
use vfd_common::config::{ConfigResolver, RandomSourceConfig};

/// Command-line arguments for vfd-analyzer
#[derive(Parser, Debug)]
#[command(name = "vfd-analyzer")]
#[command(about = "Score recorded voice audio for signs of synthetic or fraudulent speech")]
#[command(version)]
struct Args {
    /// Config file (takes priority over VFD_CONFIG and platform config paths)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed the random score term so repeated runs give identical verdicts
    #[arg(long, conflicts_with = "fixed_draw")]
    seed: Option<u64>,

    /// Use a constant random score term in [0, 1)
    #[arg(long)]
    fixed_draw: Option<f64>,

    /// Include the 55-value feature vector in each output line
    #[arg(long)]
    features: bool,

    /// Audio files to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct OutputLine<'a> {
    file: String,
    result: &'a ScoreResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<&'a FeatureVector>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; the configured level is applied once the config is
    // loaded unless RUST_LOG is set
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).is_ok();
    let initial = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, filter_handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    info!(
        "Starting vfd-analyzer v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut config = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;

    if !rust_log {
        let level = EnvFilter::try_new(&config.logging.level)
            .with_context(|| format!("Invalid logging.level '{}'", config.logging.level))?;
        filter_handle
            .reload(level)
            .context("Failed to apply configured log level")?;
    }

    if let Some(seed) = args.seed {
        config.scoring.random = RandomSourceConfig::Seeded { seed };
    }
    if let Some(value) = args.fixed_draw {
        config.scoring.random = RandomSourceConfig::Fixed { value };
    }
    info!("Random score term: {:?}", config.scoring.random);

    let analyzer = Arc::new(Analyzer::from_config(&config).context("Invalid configuration")?);

    // Spawn every file up front, then collect in argument order
    let mut tasks = Vec::with_capacity(args.files.len());
    for path in args.files {
        let analyzer = Arc::clone(&analyzer);
        tasks.push(tokio::spawn(async move {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let report = tokio::task::spawn_blocking(move || analyzer.analyze_detailed(&bytes))
                .await
                .context("Analysis task panicked")?;
            Ok::<_, anyhow::Error>((path, report))
        }));
    }

    let total = tasks.len();
    let mut failed = 0usize;
    for task in tasks {
        match task.await.context("File task panicked")? {
            Ok((path, report)) => {
                let line = OutputLine {
                    file: path.display().to_string(),
                    result: &report.result,
                    features: if args.features {
                        report.features.as_ref()
                    } else {
                        None
                    },
                };
                println!("{}", serde_json::to_string(&line)?);
            }
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files could not be read", failed, total);
    }

    info!("Analyzed {} file(s)", total);
    Ok(())
}
