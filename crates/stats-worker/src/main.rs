//! PGN statistics aggregator
//!
//! Reads a PGN file, extracts per-game statistics on a pool of workers and
//! writes the merged, normalized totals as JSON.

use std::time::Instant;

use tracing::info;

use stats_worker::config::StatsConfig;
use stats_worker::{output, pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first so RUST_LOG from it applies
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = StatsConfig::load()?;
    let started = Instant::now();

    let outcome = pipeline::run_file(&config).await?;

    let path = config.output_file();
    output::write_report(&outcome.cohorts, &path, config.indent)?;

    info!(
        games_read = outcome.games_read,
        extracted = outcome.tally.extracted,
        prune_threshold = outcome.prune_threshold,
        elapsed_ms = started.elapsed().as_millis() as u64,
        output = %path.display(),
        "Done"
    );
    Ok(())
}
