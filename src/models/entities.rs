//! Persisted records

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the sales rep seeded into a fresh database.
pub const DEFAULT_SALES_REP_ID: Uuid = Uuid::from_u128(0x1111_1111_2222_3333_4444_5555_5555_5555);

/// Account owner. Owns zero or more clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRep {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl SalesRep {
    /// The rep every new installation starts with.
    pub fn default_rep() -> Self {
        Self {
            id: DEFAULT_SALES_REP_ID,
            name: "Comercial Por Defecto".to_string(),
            email: "default@acme.com".to_string(),
            phone: None,
        }
    }
}

/// Customer visit record. Always references exactly one sales rep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub contact_email: String,
    pub visit_date: NaiveDateTime,
    pub sales_rep_id: Uuid,
    pub notes: Option<String>,
}
