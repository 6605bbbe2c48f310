use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use tracing::debug;

use models::kv;

use crate::kv::errors::StorageError;
use crate::kv::repository::KvRepository;

/// SeaORM-backed storage adapter over the `kv` table.
///
/// Holds the shared connection handed over at startup; it never opens one
/// itself.
pub struct SeaOrmKvRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmKvRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl KvRepository for SeaOrmKvRepository {
    async fn create(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let am = kv::ActiveModel { key: Set(key.to_string()), value: Set(value.to_string()) };
        // The primary key decides existence; no read before the insert.
        kv::Entity::insert(am)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => StorageError::KeyExists(key.to_string()),
                _ => StorageError::Database(e),
            })?;
        debug!(%key, "kv_created");
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<String, StorageError> {
        kv::Entity::find_by_id(key.to_string())
            .one(&self.db)
            .await
            .map_err(StorageError::Database)?
            .map(|m| m.value)
            .ok_or_else(|| StorageError::KeyNotFound(key.to_string()))
    }

    async fn update(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let res = kv::Entity::update_many()
            .col_expr(kv::Column::Value, Expr::value(value.to_string()))
            .filter(kv::Column::Key.eq(key))
            .exec(&self.db)
            .await
            .map_err(StorageError::Database)?;
        affected(res.rows_affected, key)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let res = kv::Entity::delete_by_id(key.to_string())
            .exec(&self.db)
            .await
            .map_err(StorageError::Database)?;
        affected(res.rows_affected, key)
    }
}

fn affected(rows: u64, key: &str) -> Result<(), StorageError> {
    if rows == 0 {
        return Err(StorageError::KeyNotFound(key.to_string()));
    }
    Ok(())
}
