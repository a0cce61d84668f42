//! In-memory Storage Backend
//!
//! Insertion-ordered tables behind an async lock. It enforces nothing beyond
//! identifier uniqueness: relational rules are the services' job.

use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ClientRepository, SalesRepRepository, StorageResult};
use crate::models::{Client, SalesRep};

#[derive(Default)]
struct Tables {
    sales_reps: Vec<SalesRep>,
    clients: Vec<Client>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SalesRepRepository for InMemoryStore {
    async fn find_all(&self) -> StorageResult<Vec<SalesRep>> {
        Ok(self.tables.read().await.sales_reps.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<SalesRep>> {
        let tables = self.tables.read().await;
        Ok(tables.sales_reps.iter().find(|r| r.id == id).cloned())
    }

    async fn exists(&self, id: Uuid) -> StorageResult<bool> {
        Ok(self.tables.read().await.sales_reps.iter().any(|r| r.id == id))
    }

    async fn insert(&self, rep: &SalesRep) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        if tables.sales_reps.iter().any(|r| r.id == rep.id) {
            return Err(anyhow!("duplicate sales rep id {}", rep.id).into());
        }
        tables.sales_reps.push(rep.clone());
        Ok(())
    }

    async fn replace(&self, rep: &SalesRep) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.sales_reps.iter_mut().find(|r| r.id == rep.id) {
            Some(slot) => {
                *slot = rep.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: Uuid) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.sales_reps.len();
        tables.sales_reps.retain(|r| r.id != id);
        Ok(tables.sales_reps.len() != before)
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn find_all(&self) -> StorageResult<Vec<Client>> {
        Ok(self.tables.read().await.clients.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_sales_rep(&self, sales_rep_id: Uuid) -> StorageResult<Vec<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .iter()
            .filter(|c| c.sales_rep_id == sales_rep_id)
            .cloned()
            .collect())
    }

    async fn exists(&self, id: Uuid) -> StorageResult<bool> {
        Ok(self.tables.read().await.clients.iter().any(|c| c.id == id))
    }

    async fn insert(&self, client: &Client) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        if tables.clients.iter().any(|c| c.id == client.id) {
            return Err(anyhow!("duplicate client id {}", client.id).into());
        }
        tables.clients.push(client.clone());
        Ok(())
    }

    async fn replace(&self, client: &Client) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.clients.iter_mut().find(|c| c.id == client.id) {
            Some(slot) => {
                *slot = client.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: Uuid) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.clients.len();
        tables.clients.retain(|c| c.id != id);
        Ok(tables.clients.len() != before)
    }
}
