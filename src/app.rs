//! Query operations exposed by sleeperboard
//!
//! `App` owns the process-wide player directory and upstream client, is built
//! once at startup, and is shared by reference with every request handler.
//! Inputs are validated here before any upstream call is attempted.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::data::client::Endpoint;
use crate::data::{
    build_scoreboard, FetchError, LookupError, Matchup, MatchupEntry, PlayerDirectory, Roster,
    UpstreamClient, User,
};

/// Highest week number accepted, covering regular season and playoffs
pub const MAX_WEEK: u32 = 25;

/// Errors surfaced to callers of the query operations
#[derive(Debug, Error)]
pub enum AppError {
    /// A name or id translation found nothing
    #[error(transparent)]
    NotFound(#[from] LookupError),

    /// Malformed or missing input; raised before any upstream call
    #[error("invalid input: {0}")]
    Validation(String),

    /// The upstream call failed
    #[error(transparent)]
    Upstream(#[from] FetchError),
}

/// The query surface of the service
#[derive(Debug, Clone)]
pub struct App {
    directory: Arc<PlayerDirectory>,
    client: Arc<UpstreamClient>,
}

impl App {
    /// Creates an App over an already loaded directory and client
    pub fn new(directory: Arc<PlayerDirectory>, client: Arc<UpstreamClient>) -> Self {
        Self { directory, client }
    }

    pub fn directory(&self) -> &PlayerDirectory {
        &self.directory
    }

    pub fn client(&self) -> &UpstreamClient {
        &self.client
    }

    /// Current league-state snapshot (week, season, ...) as returned upstream
    pub async fn get_nfl_state(&self) -> Result<Value, AppError> {
        Ok(self.client.get_json(Endpoint::NflState).await?)
    }

    /// Player id for an exact full name
    ///
    /// The name is matched as given; surrounding whitespace is not stripped.
    pub fn get_player_id(&self, full_name: &str) -> Result<String, AppError> {
        require_non_blank("name", full_name)?;
        Ok(self.directory.resolve_id(full_name)?.to_string())
    }

    /// Full name for a player id
    pub fn get_player_name(&self, player_id: &str) -> Result<String, AppError> {
        require_non_blank("player id", player_id)?;
        Ok(self.directory.resolve_name(player_id)?.to_string())
    }

    pub async fn get_league_rosters(&self, league_id: &str) -> Result<Value, AppError> {
        let league = validate_league_id(league_id)?;
        Ok(self.client.get_json(Endpoint::LeagueRosters(league)).await?)
    }

    pub async fn get_league_users(&self, league_id: &str) -> Result<Value, AppError> {
        let league = validate_league_id(league_id)?;
        Ok(self.client.get_json(Endpoint::LeagueUsers(league)).await?)
    }

    /// Raw matchup entries for one league week
    pub async fn get_league_matchups(&self, league_id: &str, week: &str) -> Result<Value, AppError> {
        let league = validate_league_id(league_id)?;
        let week = parse_week(week)?;
        Ok(self
            .client
            .get_json(Endpoint::LeagueMatchups(league, week))
            .await?)
    }

    /// Joined, name-resolved scoreboard for one league week
    ///
    /// Users, rosters and matchups are fetched concurrently. If any of the
    /// three fails, the whole call fails with that error and nothing is joined.
    #[instrument(skip(self))]
    pub async fn get_matchup_scoreboard(
        &self,
        league_id: &str,
        week: &str,
    ) -> Result<Vec<Matchup>, AppError> {
        let league = validate_league_id(league_id)?;
        let week = parse_week(week)?;

        let (users, rosters, entries) = futures::try_join!(
            self.client.get_list::<User>(Endpoint::LeagueUsers(league)),
            self.client.get_list::<Roster>(Endpoint::LeagueRosters(league)),
            self.client
                .get_list::<MatchupEntry>(Endpoint::LeagueMatchups(league, week)),
        )?;
        debug!(
            users = users.len(),
            rosters = rosters.len(),
            entries = entries.len(),
            "joining scoreboard"
        );

        Ok(build_scoreboard(week, &users, &rosters, &entries, &self.directory))
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Trims `value` and rejects it when blank
fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    require_non_blank(field, value)?;
    Ok(value.trim())
}

/// League ids are opaque but always ASCII alphanumeric
fn validate_league_id(league_id: &str) -> Result<&str, AppError> {
    let league = require_text("league id", league_id)?;
    if !league.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::Validation(format!(
            "league id '{}' must be alphanumeric",
            league
        )));
    }
    Ok(league)
}

/// Parses a week number in `1..=MAX_WEEK`
fn parse_week(week: &str) -> Result<u32, AppError> {
    let raw = require_text("week", week)?;
    match raw.parse::<u32>() {
        Ok(w) if (1..=MAX_WEEK).contains(&w) => Ok(w),
        _ => Err(AppError::Validation(format!(
            "week must be an integer between 1 and {}, got '{}'",
            MAX_WEEK, raw
        ))),
    }
}
