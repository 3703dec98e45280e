mod config;
mod error;
mod extract;
mod fetch;
mod normalize;
mod pipeline;
mod record;
mod validate;
mod writer;

use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;
use crate::pipeline::RunOptions;

#[derive(Parser)]
#[command(name = "g2_scraper", about = "G2 product page scraper")]
struct Cli {
    /// File with one G2 product URL or local HTML path per line
    #[arg(long, default_value = config::DEFAULT_INPUTS)]
    inputs: PathBuf,
    /// Where to write the JSON array of records
    #[arg(long, default_value = config::DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Optional JSON settings file
    #[arg(long, default_value = config::DEFAULT_SETTINGS)]
    settings: PathBuf,
    /// JSON Schema every record must satisfy
    #[arg(long, default_value = config::DEFAULT_SCHEMA)]
    schema: PathBuf,
    /// Seconds to wait between network fetches (settings file wins)
    #[arg(long, default_value_t = config::DEFAULT_DELAY_SECONDS)]
    delay: f64,
    /// Log level when RUST_LOG is unset
    #[arg(long = "log", default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.to_lowercase().into()),
        )
        .init();

    let settings = Settings::load(&cli.settings, cli.delay)?;
    pipeline::run(&RunOptions {
        inputs: cli.inputs,
        output: cli.output,
        schema: cli.schema,
        settings,
    })
    .await?;
    Ok(())
}

// ── Tests ──
