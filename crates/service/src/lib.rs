//! Service layer for the key-value store.
//! - `kv::repository` is the storage capability; `kv::repo::seaorm` implements it.
//! - `kv::service` re-types storage outcomes so engine details stay below it.

pub mod kv;
#[cfg(test)]
pub mod test_support;
