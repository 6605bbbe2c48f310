use async_trait::async_trait;

use super::errors::StorageError;

/// Single-key storage capability consumed by [`super::KvService`].
///
/// Every operation is one statement against the engine; implementations
/// report missing and duplicate keys as typed [`StorageError`] variants.
#[async_trait]
pub trait KvRepository: Send + Sync {
    async fn create(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn read(&self, key: &str) -> Result<String, StorageError>;
    async fn update(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    use sea_orm::DbErr;

    #[derive(Default)]
    pub struct MockKvRepository {
        entries: Mutex<HashMap<String, String>>,
        failing: bool,
    }

    impl MockKvRepository {
        /// A repository whose every call fails with a database error.
        pub fn failing() -> Self {
            Self { entries: Mutex::default(), failing: true }
        }

        /// Number of stored records, for asserting on (absent) side effects.
        pub fn len(&self) -> usize {
            self.entries().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
            self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        fn check(&self) -> Result<(), StorageError> {
            if self.failing {
                return Err(StorageError::Database(DbErr::Custom("injected failure".into())));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KvRepository for MockKvRepository {
        async fn create(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.check()?;
            let mut entries = self.entries();
            if entries.contains_key(key) {
                return Err(StorageError::KeyExists(key.to_string()));
            }
            entries.insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn read(&self, key: &str) -> Result<String, StorageError> {
            self.check()?;
            self.entries()
                .get(key)
                .cloned()
                .ok_or_else(|| StorageError::KeyNotFound(key.to_string()))
        }

        async fn update(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.check()?;
            match self.entries().get_mut(key) {
                Some(slot) => {
                    *slot = value.to_string();
                    Ok(())
                }
                None => Err(StorageError::KeyNotFound(key.to_string())),
            }
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.check()?;
            self.entries()
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| StorageError::KeyNotFound(key.to_string()))
        }
    }
}
