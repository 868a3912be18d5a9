//! Order-manager simulator entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Order-manager simulator: random order flow against a throttled,
/// cross-checked market gateway.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via OMSIM_CONFIG)
    #[arg(short, long)]
    config: Option<String>,

    /// Number of ticks to run (0 = run until interrupted)
    #[arg(short, long, default_value_t = 0)]
    ticks: u64,

    /// Override the configured RNG seed
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    omsim_driver::init_logging()?;
    info!("Starting omsim v{}", env!("CARGO_PKG_VERSION"));

    let mut config = omsim_driver::config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let mut driver = omsim_driver::Driver::new(config);
    driver.run(args.ticks);

    Ok(())
}
