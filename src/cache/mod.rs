//! Local persistent cache of catalog entities and their associated records.
//!
//! The cache is append-only: repeated synchronization of the same data adds
//! rows rather than replacing them. An entity counts as synchronized as soon
//! as one associated record exists for it.

mod storage;

pub use storage::{CacheStore, SqliteCache};
