//! Core data models for sleeperboard
//!
//! Upstream record shapes as returned by the Sleeper API, plus the derived
//! scoreboard types produced by joining them.

pub mod client;
pub mod directory;
pub mod scoreboard;

pub use client::{
    FetchError, UpstreamClient, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SNAPSHOT_TIMEOUT,
};
pub use directory::{LookupError, PlayerDirectory};
pub use scoreboard::build_scoreboard;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A single player from the bulk player snapshot
///
/// Every field is optional upstream; team defenses, for example, carry a
/// first and last name but no `full_name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PlayerRecord {
    /// Name the directory indexes this record under
    ///
    /// `full_name` when present, otherwise `"{first_name} {last_name}"`.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                Some(format!("{} {}", first, last))
            }
            _ => None,
        }
    }
}

/// Team-level metadata attached to a league user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub team_name: Option<String>,
}

/// A member of a league
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: UserMetadata,
}

/// A league roster and its owner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub starters: Vec<String>,
}

/// One roster's result for a given week
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupEntry {
    pub roster_id: u32,
    #[serde(default)]
    pub matchup_id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub starters: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players_points: HashMap<String, f64>,
}

/// One team's resolved view within a matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    pub roster_id: u32,
    /// Owning user, if the roster has one
    pub user_id: Option<String>,
    /// Owner's display name, empty when the owner could not be resolved
    pub user_name: String,
    /// Owner's team name, empty when unknown
    pub team_name: String,
    /// Starter names, raw ids where the directory has no match
    pub starters: Vec<String>,
    /// Whole roster for the week, resolved the same way as `starters`
    pub players: Vec<String>,
    pub points: f64,
    /// Points per player, keyed by resolved name
    pub players_points: HashMap<String, f64>,
    /// `players_points` restricted to starters
    pub starters_points: HashMap<String, f64>,
}

/// Entries sharing a matchup id in a given week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub matchup_id: Option<u32>,
    pub week: u32,
    pub entries: Vec<ScoreboardEntry>,
}

/// Treats an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
