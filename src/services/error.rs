use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Closed set of outcomes a consistency service can fail with.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A client write named a sales rep that does not exist.
    #[error("sales rep '{0}' not found")]
    ReferenceNotFound(Uuid),
    /// A sales rep delete was refused; carries the blocking client names.
    #[error("cannot delete sales rep: it has {} associated client(s): {}", .0.len(), .0.join(", "))]
    DependentRecordsExist(Vec<String>),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
