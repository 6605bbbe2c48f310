//! Key-value module: storage capability, SeaORM adapter and the service
//! that re-types storage outcomes for API consumers.

pub mod errors;
pub mod repository;
pub mod repo;
pub mod service;

pub use errors::{KvServiceError, StorageError};
pub use repository::KvRepository;
pub use service::KvService;
