//! Caching layers in front of the upstream API
//!
//! Two stores live here: an in-memory LRU/TTL cache of upstream responses
//! keyed by URL, and the on-disk copy of the bulk player snapshot, which is
//! the only state kept across restarts.

mod response;
mod snapshot;

pub use response::{ResponseCache, DEFAULT_CAPACITY, DEFAULT_TTL};
pub use snapshot::{SnapshotStore, SNAPSHOT_FILE_NAME};
