//! Read views
//!
//! What the services hand to the transport layer. Detailed views carry the
//! related records the service loaded explicitly; nothing is joined behind
//! the caller's back.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{Client, SalesRep};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRepSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
}

/// Client plus the rep it points at, when that rep could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    pub id: Uuid,
    pub name: String,
    pub contact_email: String,
    pub visit_date: NaiveDateTime,
    pub sales_rep_id: Uuid,
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_rep: Option<SalesRepSummary>,
}

/// Sales rep plus every client that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRepView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub clients: Vec<ClientSummary>,
}

impl ClientView {
    pub fn new(client: Client, sales_rep: Option<&SalesRep>) -> Self {
        Self {
            id: client.id,
            name: client.name,
            contact_email: client.contact_email,
            visit_date: client.visit_date,
            sales_rep_id: client.sales_rep_id,
            notes: client.notes,
            sales_rep: sales_rep.map(|rep| SalesRepSummary {
                id: rep.id,
                name: rep.name.clone(),
            }),
        }
    }
}

impl SalesRepView {
    pub fn new(rep: SalesRep, clients: &[Client]) -> Self {
        Self {
            id: rep.id,
            name: rep.name,
            email: rep.email,
            phone: rep.phone,
            clients: clients
                .iter()
                .map(|c| ClientSummary {
                    id: c.id,
                    name: c.name.clone(),
                })
                .collect(),
        }
    }
}
