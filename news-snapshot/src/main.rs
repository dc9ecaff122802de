use anyhow::Context;
use clap::Parser;
use news_snapshot::{HarvestConfig, HarvestPipeline};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fetch the configured feeds once and store today's snapshot.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON config file; built-in feeds and defaults are used without one
    #[arg(long, env = "NEWS_SNAPSHOT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory snapshots are written to
    #[arg(long, env = "NEWS_SNAPSHOT_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = HarvestConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(data_dir) = args.data_dir {
        config = config.with_data_dir(data_dir);
    }

    info!("Starting news snapshot run");
    info!("Data directory: {}", config.data_dir.display());

    let pipeline = HarvestPipeline::builder(config)
        .build()
        .context("Failed to set up pipeline")?;

    let report = pipeline.run().await.map_err(|e| {
        error!("Run aborted: {}", e);
        e
    })?;

    info!("Saved to {}", report.location);
    report.log_summary();
    Ok(())
}
