//! Tracing setup for the ask binary.
//!
//! Logs always go to stderr so stdout carries nothing but the answer.
//!
//!   ask --debug ...             # debug logs from ask itself
//!   RUST_LOG=reqwest=trace ask  # fine-grained control, wins over --debug

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    pub debug: bool,
}

pub fn init(config: &TracingConfig) -> Result<()> {
    let default_directives = if config.debug { "warn,ask=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
