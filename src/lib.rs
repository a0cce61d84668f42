//! ACME Customers
//!
//! CRUD service for sales reps and their client visit records:
//! - SQLite or in-memory storage behind repository traits
//! - consistency services enforcing the client → sales rep relation
//! - JSON REST API plus HTML fragments for an HTMX front end

pub mod config;
pub mod models;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

// Re-exports for convenience
pub use config::ServerConfig;
pub use server::{router, run_server, AppState};
pub use services::{ClientService, SalesRepService, ServiceError};
pub use storage::{InMemoryStore, SqliteStore};
