use sea_orm::DbErr;
use thiserror::Error;

/// Outcomes of the storage tier. Only this tier knows about the engine.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("key not found: '{0}'")]
    KeyNotFound(String),
    #[error("key already exists: '{0}'")]
    KeyExists(String),
    #[error("database error: {0}")]
    Database(#[source] DbErr),
}

/// Outcomes of the service tier.
///
/// `Storage` is deliberately opaque in its message; the lower error stays
/// reachable through `source()` for server-side logs.
#[derive(Debug, Error)]
pub enum KvServiceError {
    #[error("resource not found: '{0}'")]
    ResourceNotFound(String),
    #[error("resource already exists: '{0}'")]
    ResourceExists(String),
    #[error("storage failure")]
    Storage(#[source] StorageError),
}

impl KvServiceError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            KvServiceError::ResourceNotFound(_) => 1003,
            KvServiceError::ResourceExists(_) => 1002,
            KvServiceError::Storage(_) => 1200,
        }
    }
}
