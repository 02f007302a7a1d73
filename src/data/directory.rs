//! Bidirectional player id / name index
//!
//! Built once at startup from the bulk player snapshot and never mutated
//! afterwards, so concurrent readers need no synchronization.

use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, info, warn};

use super::client::UpstreamClient;
use super::PlayerRecord;
use crate::cache::SnapshotStore;

/// A lookup against the directory found nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no player named '{0}'")]
    UnknownName(String),

    #[error("no player with id '{0}'")]
    UnknownId(String),
}

/// Why a snapshot could not be turned into a directory
#[derive(Debug, Error)]
enum SnapshotError {
    #[error("could not read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not download snapshot: {0}")]
    Fetch(#[from] super::client::FetchError),

    #[error("snapshot is not a JSON object of players: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only index between player ids and display names
#[derive(Debug, Default, Clone)]
pub struct PlayerDirectory {
    name_to_id: HashMap<String, String>,
    id_to_name: HashMap<String, String>,
}

impl PlayerDirectory {
    /// Loads the directory from the persisted snapshot, downloading it first if absent
    ///
    /// A missing snapshot is fetched from upstream exactly once and written to
    /// disk verbatim before it is parsed. Any failure along the way is logged
    /// and yields an empty directory, so lookups report not-found until the
    /// process is restarted with a usable snapshot.
    pub async fn load(store: &SnapshotStore, client: &UpstreamClient) -> Self {
        match Self::try_load(store, client).await {
            Ok(directory) => {
                info!(
                    players = directory.len(),
                    path = %store.path().display(),
                    "player directory loaded"
                );
                directory
            }
            Err(e) => {
                error!(
                    error = %e,
                    path = %store.path().display(),
                    "player directory unavailable, name lookups will fail"
                );
                Self::default()
            }
        }
    }

    async fn try_load(store: &SnapshotStore, client: &UpstreamClient) -> Result<Self, SnapshotError> {
        let body = match store.read()? {
            Some(body) => body,
            None => {
                info!(path = %store.path().display(), "no player snapshot on disk, downloading");
                let body = client.players_snapshot().await?;
                if let Err(e) = store.write(&body) {
                    warn!(error = %e, "could not persist player snapshot");
                }
                body
            }
        };

        Self::from_snapshot(&body)
    }

    /// Parses a snapshot body: a JSON object mapping player id to record
    fn from_snapshot(body: &str) -> Result<Self, SnapshotError> {
        let players: Map<String, Value> = serde_json::from_str(body)?;

        let mut skipped = 0usize;
        let records = players.into_iter().filter_map(|(id, value)| {
            match serde_json::from_value::<PlayerRecord>(value) {
                Ok(record) => Some((id, record)),
                Err(_) => {
                    skipped += 1;
                    None
                }
            }
        });
        let directory = Self::from_records(records);

        if skipped > 0 {
            warn!(skipped, "ignored malformed player records");
        }
        Ok(directory)
    }

    /// Builds both mappings from `(id, record)` pairs in order
    ///
    /// Records without a usable name are left out. When two records share a
    /// name, the one seen last owns it in the name-to-id mapping.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, PlayerRecord)>,
    {
        let mut directory = Self::default();
        for (id, record) in records {
            let Some(name) = record.display_name() else {
                continue;
            };
            directory.name_to_id.insert(name.clone(), id.clone());
            directory.id_to_name.insert(id, name);
        }
        directory
    }

    /// Name for an id, if known
    pub fn lookup_name(&self, id: &str) -> Option<&str> {
        self.id_to_name.get(id).map(String::as_str)
    }

    /// Id for an exact full name
    pub fn resolve_id(&self, name: &str) -> Result<&str, LookupError> {
        self.name_to_id
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| LookupError::UnknownName(name.to_string()))
    }

    /// Full name for an id
    pub fn resolve_name(&self, id: &str) -> Result<&str, LookupError> {
        self.lookup_name(id)
            .ok_or_else(|| LookupError::UnknownId(id.to_string()))
    }

    /// Name for an id, or the id itself when unknown
    pub fn name_or_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.lookup_name(id).unwrap_or(id)
    }

    /// Number of players indexed by id
    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }
}
