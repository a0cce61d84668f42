//! Client Consistency Service

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::{Client, ClientInput, ClientView};
use crate::storage::{ClientRepository, SalesRepRepository, StorageError};

pub struct ClientService {
    clients: Arc<dyn ClientRepository>,
    sales_reps: Arc<dyn SalesRepRepository>,
}

impl ClientService {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        sales_reps: Arc<dyn SalesRepRepository>,
    ) -> Self {
        Self { clients, sales_reps }
    }

    /// Every client, each with its resolved sales rep.
    pub async fn list_all(&self) -> ServiceResult<Vec<ClientView>> {
        let clients = self.clients.find_all().await?;
        let reps: HashMap<Uuid, _> = self
            .sales_reps
            .find_all()
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();
        debug!("Listing {} clients", clients.len());
        Ok(clients
            .into_iter()
            .map(|c| {
                let rep = reps.get(&c.sales_rep_id);
                ClientView::new(c, rep)
            })
            .collect())
    }

    /// Shallow read: the stored record only.
    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<Client>> {
        Ok(self.clients.find_by_id(id).await?)
    }

    /// The record plus its resolved sales rep.
    pub async fn get_details(&self, id: Uuid) -> ServiceResult<Option<ClientView>> {
        let Some(client) = self.clients.find_by_id(id).await? else {
            return Ok(None);
        };
        let rep = self.sales_reps.find_by_id(client.sales_rep_id).await?;
        Ok(Some(ClientView::new(client, rep.as_ref())))
    }

    pub async fn create(&self, input: ClientInput) -> ServiceResult<Uuid> {
        self.ensure_sales_rep(input.sales_rep_id).await?;

        let client = Client {
            id: Uuid::new_v4(),
            name: input.name,
            contact_email: input.contact_email,
            visit_date: input.visit_date,
            sales_rep_id: input.sales_rep_id,
            notes: input.notes,
        };
        self.clients
            .insert(&client)
            .await
            .map_err(|e| reference_error(e, client.sales_rep_id))?;

        info!(
            "Created client {} ({}) for sales rep {}",
            client.id, client.name, client.sales_rep_id
        );
        Ok(client.id)
    }

    /// Returns `false` when `id` is unknown. The sales rep is re-checked on
    /// every update, changed or not.
    pub async fn update(&self, id: Uuid, input: ClientInput) -> ServiceResult<bool> {
        if !self.clients.exists(id).await? {
            debug!("Update skipped: client {} not found", id);
            return Ok(false);
        }
        self.ensure_sales_rep(input.sales_rep_id).await?;

        let client = Client {
            id,
            name: input.name,
            contact_email: input.contact_email,
            visit_date: input.visit_date,
            sales_rep_id: input.sales_rep_id,
            notes: input.notes,
        };
        let updated = self
            .clients
            .replace(&client)
            .await
            .map_err(|e| reference_error(e, client.sales_rep_id))?;

        if updated {
            info!("Updated client {}", id);
        }
        Ok(updated)
    }

    /// Clients have no dependents, so removal is unconditional.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<bool> {
        let deleted = self.clients.remove(id).await?;
        if deleted {
            info!("Deleted client {}", id);
        }
        Ok(deleted)
    }

    async fn ensure_sales_rep(&self, sales_rep_id: Uuid) -> ServiceResult<()> {
        if self.sales_reps.exists(sales_rep_id).await? {
            Ok(())
        } else {
            warn!("Rejected client write: sales rep {} not found", sales_rep_id);
            Err(ServiceError::ReferenceNotFound(sales_rep_id))
        }
    }
}

/// A backend that enforces foreign keys reports a rep deleted between the
/// existence check and the write as a constraint violation.
fn reference_error(err: StorageError, sales_rep_id: Uuid) -> ServiceError {
    match err {
        StorageError::ForeignKeyViolation => {
            warn!("Sales rep {} vanished before client write", sales_rep_id);
            ServiceError::ReferenceNotFound(sales_rep_id)
        }
        other => ServiceError::Storage(other),
    }
}
