//! Persistence model for the key-value table: the SeaORM entity and the
//! connection/schema bootstrap shared by the storage adapter and tests.

pub mod db;
pub mod kv;
