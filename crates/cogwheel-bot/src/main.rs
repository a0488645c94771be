//! Main entry point for Cogwheel.

use anyhow::Result;
use clap::Parser;
use cogwheel_bot::{Args, CogwheelBot};
use cogwheel_common::logging::{init_dev_logging, init_logging, LoggingConfig};
use cogwheel_config::ConfigLoader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    args.apply(&mut config);

    let _guard = if args.dev {
        init_dev_logging()
    } else {
        init_logging(&LoggingConfig::from(&config.logging))
    }
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Cogwheel");

    if let Err(e) = CogwheelBot::new(config).run().await {
        error!(error = %e, "Bot stopped with an error");
        return Err(e.into());
    }

    Ok(())
}
