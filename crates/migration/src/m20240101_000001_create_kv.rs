//! Create `kv` table.
//!
//! One row per key; the primary key enforces at most one record per key.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Kv::Table)
                    .if_not_exists()
                    .col(text(Kv::Key).primary_key())
                    .col(text(Kv::Value))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Kv::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Kv { Table, Key, Value }
