use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::errors::{KvServiceError, StorageError};
use super::repository::KvRepository;

/// Key-value service independent of web framework and storage engine.
///
/// Callers only learn whether a resource was missing, already present, or
/// that something else failed.
pub struct KvService<R: KvRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: KvRepository + ?Sized> KvService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Store `value` under a key that must not exist yet.
    ///
    /// # Examples
    /// ```
    /// use service::kv::{KvService, KvServiceError, repository::mock::MockKvRepository};
    /// use std::sync::Arc;
    /// let svc = KvService::new(Arc::new(MockKvRepository::default()));
    /// tokio_test::block_on(svc.create("a", "1")).unwrap();
    /// let again = tokio_test::block_on(svc.create("a", "2"));
    /// assert!(matches!(again, Err(KvServiceError::ResourceExists(_))));
    /// ```
    #[instrument(skip(self, value))]
    pub async fn create(&self, key: &str, value: &str) -> Result<(), KvServiceError> {
        self.repo.create(key, value).await.map_err(|e| match e {
            StorageError::KeyExists(_) => KvServiceError::ResourceExists(key.to_string()),
            other => storage_failure(other),
        })?;
        debug!("resource_created");
        Ok(())
    }

    /// Fetch the value stored under `key`.
    ///
    /// # Examples
    /// ```
    /// use service::kv::{KvService, KvServiceError, repository::mock::MockKvRepository};
    /// use std::sync::Arc;
    /// let svc = KvService::new(Arc::new(MockKvRepository::default()));
    /// let missing = tokio_test::block_on(svc.read("nope"));
    /// assert!(matches!(missing, Err(KvServiceError::ResourceNotFound(_))));
    /// ```
    #[instrument(skip(self))]
    pub async fn read(&self, key: &str) -> Result<String, KvServiceError> {
        self.repo.read(key).await.map_err(|e| not_found_or_failure(e, key))
    }

    #[instrument(skip(self, value))]
    pub async fn update(&self, key: &str, value: &str) -> Result<(), KvServiceError> {
        self.repo.update(key, value).await.map_err(|e| not_found_or_failure(e, key))?;
        debug!("resource_updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), KvServiceError> {
        self.repo.delete(key).await.map_err(|e| not_found_or_failure(e, key))?;
        debug!("resource_deleted");
        Ok(())
    }
}

fn not_found_or_failure(e: StorageError, key: &str) -> KvServiceError {
    match e {
        StorageError::KeyNotFound(_) => KvServiceError::ResourceNotFound(key.to_string()),
        other => storage_failure(other),
    }
}

fn storage_failure(e: StorageError) -> KvServiceError {
    warn!(error = %e, "storage_failure");
    KvServiceError::Storage(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::repository::mock::MockKvRepository;

    fn svc() -> KvService<MockKvRepository> {
        KvService::new(Arc::new(MockKvRepository::default()))
    }

    #[tokio::test]
    async fn read_unknown_key_is_resource_not_found() {
        let s = svc();
        assert!(matches!(s.read("key1").await, Err(KvServiceError::ResourceNotFound(k)) if k == "key1"));
    }

    #[tokio::test]
    async fn create_read_update_delete_cycle() {
        let s = svc();
        s.create("k", "v1").await.unwrap();
        assert_eq!(s.read("k").await.unwrap(), "v1");
        s.update("k", "v2").await.unwrap();
        assert_eq!(s.read("k").await.unwrap(), "v2");
        s.delete("k").await.unwrap();
        assert!(matches!(s.read("k").await, Err(KvServiceError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn second_create_is_resource_exists() {
        let s = svc();
        s.create("k", "first").await.unwrap();
        assert!(matches!(s.create("k", "second").await, Err(KvServiceError::ResourceExists(k)) if k == "k"));
        assert_eq!(s.read("k").await.unwrap(), "first");
    }

    #[tokio::test]
    async fn update_missing_is_normalized_to_resource_not_found() {
        let repo = Arc::new(MockKvRepository::default());
        let s = KvService::new(repo.clone());
        assert!(matches!(s.update("k", "v").await, Err(KvServiceError::ResourceNotFound(_))));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_resource_not_found() {
        let s = svc();
        assert!(matches!(s.delete("k").await, Err(KvServiceError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn unexpected_storage_errors_are_wrapped() {
        let s = KvService::new(Arc::new(MockKvRepository::failing()));
        assert!(matches!(s.create("k", "v").await, Err(KvServiceError::Storage(StorageError::Database(_)))));
        assert!(matches!(s.read("k").await, Err(KvServiceError::Storage(_))));
        assert!(matches!(s.update("k", "v").await, Err(KvServiceError::Storage(_))));
        assert!(matches!(s.delete("k").await, Err(KvServiceError::Storage(_))));
    }

    #[tokio::test]
    async fn works_behind_a_trait_object() {
        let repo: Arc<dyn KvRepository> = Arc::new(MockKvRepository::default());
        let s: KvService<dyn KvRepository> = KvService::new(repo);
        s.create("k", "v").await.unwrap();
        assert_eq!(s.read("k").await.unwrap(), "v");
    }

    #[tokio::test]
    async fn against_sqlite() {
        let db = crate::test_support::memory_db().await.unwrap();
        let s = KvService::new(Arc::new(crate::kv::repo::seaorm::SeaOrmKvRepository::new(db)));
        s.create("a", "1").await.unwrap();
        assert!(matches!(s.create("a", "1").await, Err(KvServiceError::ResourceExists(_))));
        assert!(matches!(s.update("b", "1").await, Err(KvServiceError::ResourceNotFound(_))));
        s.delete("a").await.unwrap();
        assert!(matches!(s.delete("a").await, Err(KvServiceError::ResourceNotFound(_))));
    }
}
