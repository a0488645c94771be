//! Command line arguments.

use clap::Parser;
use cogwheel_config::Config;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "cogwheel", author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level, overriding the configuration file
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Development mode: pretty debug logging
    #[arg(long)]
    pub dev: bool,
}

impl Args {
    /// Applies command line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
    }
}
