use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use swarmlab::core::logging;
use swarmlab::experiment::run_from_config;

/// Run consensus experiments described by a YAML or JSON config file.
#[derive(Debug, Parser)]
#[command(name = "swarmlab", version)]
struct Args {
    /// Path to the experiment config
    config: PathBuf,

    /// Override the output directory from the config
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(&args.log_level);

    tracing::info!("🚀 swarmlab experiment runner starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Config: {}", args.config.display());

    let outputs = run_from_config(&args.config, args.output_dir).await?;

    tracing::info!("✅ Wrote {} result file(s)", outputs.len());
    Ok(())
}
