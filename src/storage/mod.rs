//! Storage Gateway
//!
//! The persistence interface consumed by the consistency services. Each
//! record kind gets its own repository trait; a backend usually implements
//! both. Writes are durable once the call returns, so there is no separate
//! commit step.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Client, SalesRep};

#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend refused a write because it would break a relation
    /// (dangling client reference or deleting a referenced rep).
    #[error("write rejected by a foreign key constraint")]
    ForeignKeyViolation,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[async_trait]
pub trait SalesRepRepository: Send + Sync {
    /// All reps in insertion order.
    async fn find_all(&self) -> StorageResult<Vec<SalesRep>>;
    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<SalesRep>>;
    async fn exists(&self, id: Uuid) -> StorageResult<bool>;
    async fn insert(&self, rep: &SalesRep) -> StorageResult<()>;
    /// Overwrites every scalar field. Returns `false` when no row matched.
    async fn replace(&self, rep: &SalesRep) -> StorageResult<bool>;
    /// Returns `false` when no row matched.
    async fn remove(&self, id: Uuid) -> StorageResult<bool>;
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// All clients in insertion order.
    async fn find_all(&self) -> StorageResult<Vec<Client>>;
    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Client>>;
    /// Clients referencing `sales_rep_id`, in insertion order.
    async fn find_by_sales_rep(&self, sales_rep_id: Uuid) -> StorageResult<Vec<Client>>;
    async fn exists(&self, id: Uuid) -> StorageResult<bool>;
    async fn insert(&self, client: &Client) -> StorageResult<()>;
    async fn replace(&self, client: &Client) -> StorageResult<bool>;
    async fn remove(&self, id: Uuid) -> StorageResult<bool>;
}
