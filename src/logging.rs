//! Logger setup for the command-line binary
//!
//! Library code only talks to the `log` facade; the binary installs
//! `env_logger` so `RUST_LOG` can override the level picked from flags.

use anyhow::{anyhow, Result};

/// Default level selected by --quiet / --verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn default_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "off",
            Verbosity::Normal => "error",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Install the process-wide logger. Fails if one is already set.
pub fn init_logger(verbosity: Verbosity) -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(verbosity.default_filter()),
    )
    .format_target(false)
    .try_init()
    .map_err(|e| anyhow!("Failed to set logger: {}", e))
}
