//! Domain Model
//!
//! Persisted records (`SalesRep`, `Client`), the validated inputs used to
//! create or replace them, and the read views handed to the transport layer.

pub mod entities;
pub mod input;
pub mod views;

pub use entities::{Client, SalesRep, DEFAULT_SALES_REP_ID};
pub use input::{
    ClientInput, ClientPayload, FieldError, SalesRepInput, SalesRepPayload, ValidationError,
};
pub use views::{ClientSummary, ClientView, SalesRepSummary, SalesRepView};
