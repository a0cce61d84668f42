//! Logging setup
//!
//! Installs the global tracing subscriber: an `EnvFilter` driven by
//! `RUST_LOG` plus a fmt layer on stdout.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Call once per process. `default_filter` applies when `RUST_LOG` is unset
/// or unparsable.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(true).with_line_number(true))
        .try_init()?;

    Ok(())
}
