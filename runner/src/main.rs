use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::info;

mod config;
mod pipeline;

use config::Config;
use pipeline::Pipeline;

fn main() -> Result<()> {
    // Initialize tracing; stdout carries the emitted commands only
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    info!("🚀 Starting block reducer");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "📋 Configuration loaded: {} ({} {})",
        config.service_name,
        config.family.as_str(),
        config.method.as_str()
    );

    let specs = config.load_reducers()?;
    let pipeline = Pipeline::new(config.family, &specs)?;
    info!("🧩 {} reducers resolved", specs.len());

    let input: Box<dyn BufRead> = match &config.blocks_path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    pipeline.process(input, stdout.lock(), config.method)?;

    info!("👋 Block reducer stopped");
    Ok(())
}
