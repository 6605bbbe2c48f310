use configs::DatabaseConfig;
use sea_orm::DatabaseConnection;

/// Fresh, migrated in-memory database; each call gets its own.
pub async fn memory_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::init(&DatabaseConfig::in_memory()).await
}
