//! SalesRep Consistency Service

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::{Client, SalesRep, SalesRepInput, SalesRepView};
use crate::storage::{ClientRepository, SalesRepRepository, StorageError};

pub struct SalesRepService {
    sales_reps: Arc<dyn SalesRepRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl SalesRepService {
    pub fn new(
        sales_reps: Arc<dyn SalesRepRepository>,
        clients: Arc<dyn ClientRepository>,
    ) -> Self {
        Self { sales_reps, clients }
    }

    /// Every rep together with the clients it owns.
    pub async fn list_all(&self) -> ServiceResult<Vec<SalesRepView>> {
        let reps = self.sales_reps.find_all().await?;
        let mut owned: HashMap<Uuid, Vec<Client>> = HashMap::new();
        for client in self.clients.find_all().await? {
            owned.entry(client.sales_rep_id).or_default().push(client);
        }
        debug!("Listing {} sales reps", reps.len());
        Ok(reps
            .into_iter()
            .map(|rep| {
                let clients = owned.remove(&rep.id).unwrap_or_default();
                SalesRepView::new(rep, &clients)
            })
            .collect())
    }

    /// Shallow read: the stored record only.
    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<SalesRep>> {
        Ok(self.sales_reps.find_by_id(id).await?)
    }

    /// The record plus its clients.
    pub async fn get_details(&self, id: Uuid) -> ServiceResult<Option<SalesRepView>> {
        let Some(rep) = self.sales_reps.find_by_id(id).await? else {
            return Ok(None);
        };
        let clients = self.clients.find_by_sales_rep(id).await?;
        Ok(Some(SalesRepView::new(rep, &clients)))
    }

    pub async fn create(&self, input: SalesRepInput) -> ServiceResult<Uuid> {
        let rep = SalesRep {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
        };
        self.sales_reps.insert(&rep).await?;
        info!("Created sales rep {} ({})", rep.id, rep.name);
        Ok(rep.id)
    }

    /// Returns `false` when `id` is unknown.
    pub async fn update(&self, id: Uuid, input: SalesRepInput) -> ServiceResult<bool> {
        let rep = SalesRep {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
        };
        let updated = self.sales_reps.replace(&rep).await?;
        if updated {
            info!("Updated sales rep {}", id);
        } else {
            debug!("Update skipped: sales rep {} not found", id);
        }
        Ok(updated)
    }

    /// Refuses while any client references the rep; nothing is removed in
    /// that case.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<bool> {
        if self.sales_reps.find_by_id(id).await?.is_none() {
            return Ok(false);
        }
        self.ensure_no_clients(id).await?;

        match self.sales_reps.remove(id).await {
            Ok(deleted) => {
                if deleted {
                    info!("Deleted sales rep {}", id);
                }
                Ok(deleted)
            }
            // a client was attached between the check and the delete
            Err(StorageError::ForeignKeyViolation) => {
                let names = self.dependent_names(id).await?;
                if names.is_empty() {
                    warn!("Sales rep {} delete refused but no client holds it", id);
                    return Err(StorageError::ForeignKeyViolation.into());
                }
                warn!("Sales rep {} gained clients before delete", id);
                Err(ServiceError::DependentRecordsExist(names))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_no_clients(&self, id: Uuid) -> ServiceResult<()> {
        let names = self.dependent_names(id).await?;
        if names.is_empty() {
            return Ok(());
        }
        warn!("Refused to delete sales rep {}: {} client(s) attached", id, names.len());
        Err(ServiceError::DependentRecordsExist(names))
    }

    async fn dependent_names(&self, id: Uuid) -> ServiceResult<Vec<String>> {
        let clients = self.clients.find_by_sales_rep(id).await?;
        Ok(clients.into_iter().map(|c| c.name).collect())
    }
}
