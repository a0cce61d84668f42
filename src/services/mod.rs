//! Consistency Services
//!
//! Enforce the cross-record rules before delegating to storage:
//! - a client may only be written while its sales rep exists;
//! - a sales rep may only be removed while no client references it.
//!
//! Violations are returned as `ServiceError` values, never fixed up by
//! touching other records.

pub mod clients;
pub mod error;
pub mod sales_reps;

pub use clients::ClientService;
pub use error::{ServiceError, ServiceResult};
pub use sales_reps::SalesRepService;
