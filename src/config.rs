//! Server Configuration
//!
//! Read from the process environment (a `.env` file is honoured by the
//! binary). Every key has a default so a bare `cargo run` works.

use anyhow::{bail, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "ACME_DB_PATH";
pub const BIND_ADDR_VAR: &str = "ACME_BIND_ADDR";
pub const SEED_VAR: &str = "ACME_SEED_DEFAULT_SALES_REP";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "acme_customers=info,tower_http=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Insert the default sales rep on startup when missing
    pub seed_default_sales_rep: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("customers.db"),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            seed_default_sales_rep: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(path) = get(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(addr) = get(BIND_ADDR_VAR) {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("{} is not a socket address: {}", BIND_ADDR_VAR, addr))?;
        }
        if let Some(flag) = get(SEED_VAR) {
            config.seed_default_sales_rep =
                parse_flag(&flag).with_context(|| format!("Invalid {}", SEED_VAR))?;
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}
