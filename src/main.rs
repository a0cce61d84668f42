//! ACME Customers server
//!
//! Opens the SQLite database, seeds the default sales rep when asked to, and
//! serves the JSON API and HTML fragments until Ctrl-C.

use anyhow::{Context, Result};
use tracing::info;

use acme_customers::config::{ServerConfig, DEFAULT_LOG_FILTER};
use acme_customers::utils::init_tracing;
use acme_customers::{run_server, AppState, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    init_tracing(DEFAULT_LOG_FILTER)?;

    let config = ServerConfig::from_env().context("Failed to load configuration")?;
    info!("Starting with {:?}", config);

    let store = SqliteStore::new(&config.db_path).await?;
    if config.seed_default_sales_rep {
        store
            .seed_default_sales_rep()
            .await
            .context("Failed to seed default sales rep")?;
    }

    run_server(&config, AppState::from_store(store)).await
}
