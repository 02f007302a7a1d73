//! Scoreboard aggregation
//!
//! Joins a league's users, rosters and one week's matchup entries into
//! name-resolved matchups. Missing metadata degrades to placeholders instead
//! of failing the whole scoreboard.

use std::collections::{HashMap, HashSet};

use super::{Matchup, MatchupEntry, PlayerDirectory, Roster, ScoreboardEntry, User};

/// Builds the scoreboard for one league week
///
/// # Arguments
/// * `week` - Week number attached to every matchup
/// * `users` - League members
/// * `rosters` - League rosters
/// * `entries` - Matchup entries for the week, in upstream order
/// * `directory` - Player name index
///
/// # Returns
/// One [`Matchup`] per distinct `matchup_id`, in the order each id first
/// appears in `entries`. Entries keep their upstream order within a group.
pub fn build_scoreboard(
    week: u32,
    users: &[User],
    rosters: &[Roster],
    entries: &[MatchupEntry],
    directory: &PlayerDirectory,
) -> Vec<Matchup> {
    let users_by_id: HashMap<&str, &User> =
        users.iter().map(|u| (u.user_id.as_str(), u)).collect();
    let rosters_by_id: HashMap<u32, &Roster> = rosters.iter().map(|r| (r.roster_id, r)).collect();

    let mut matchups: Vec<Matchup> = Vec::new();
    let mut slot_by_matchup: HashMap<Option<u32>, usize> = HashMap::new();

    for entry in entries {
        let owner = rosters_by_id
            .get(&entry.roster_id)
            .and_then(|roster| roster.owner_id.as_deref());
        let user = owner.and_then(|id| users_by_id.get(id).copied());

        let scoreboard_entry = resolve_entry(entry, owner, user, directory);

        let slot = *slot_by_matchup.entry(entry.matchup_id).or_insert_with(|| {
            matchups.push(Matchup {
                matchup_id: entry.matchup_id,
                week,
                entries: Vec::new(),
            });
            matchups.len() - 1
        });
        matchups[slot].entries.push(scoreboard_entry);
    }

    matchups
}

/// Resolves one matchup entry into its scoreboard view
fn resolve_entry(
    entry: &MatchupEntry,
    owner: Option<&str>,
    user: Option<&User>,
    directory: &PlayerDirectory,
) -> ScoreboardEntry {
    let (user_name, team_name) = match user {
        Some(user) => (
            user.display_name.clone(),
            user.metadata.team_name.clone().unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };

    let translate = |ids: &[String]| -> Vec<String> {
        ids.iter()
            .map(|id| directory.name_or_id(id).to_string())
            .collect()
    };

    // Starter membership is decided on raw ids, before names are resolved
    let starter_ids: HashSet<&str> = entry.starters.iter().map(String::as_str).collect();
    let mut players_points = HashMap::with_capacity(entry.players_points.len());
    let mut starters_points = HashMap::new();
    for (id, points) in &entry.players_points {
        let name = directory.name_or_id(id).to_string();
        if starter_ids.contains(id.as_str()) {
            starters_points.insert(name.clone(), *points);
        }
        players_points.insert(name, *points);
    }

    ScoreboardEntry {
        roster_id: entry.roster_id,
        user_id: owner.map(str::to_string),
        user_name,
        team_name,
        starters: translate(&entry.starters),
        players: translate(&entry.players),
        points: entry.points,
        players_points,
        starters_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PlayerRecord, UserMetadata};

    fn user(id: &str, name: &str, team: Option<&str>) -> User {
        User {
            user_id: id.to_string(),
            display_name: name.to_string(),
            metadata: UserMetadata {
                team_name: team.map(str::to_string),
            },
        }
    }

    fn roster(id: u32, owner: Option<&str>) -> Roster {
        Roster {
            roster_id: id,
            owner_id: owner.map(str::to_string),
            ..Default::default()
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn entry(
        roster_id: u32,
        matchup_id: Option<u32>,
        starters: &[&str],
        players: &[&str],
        points: &[(&str, f64)],
    ) -> MatchupEntry {
        MatchupEntry {
            roster_id,
            matchup_id,
            points: points.iter().map(|(_, p)| p).sum(),
            starters: ids(starters),
            players: ids(players),
            players_points: points.iter().map(|(id, p)| (id.to_string(), *p)).collect(),
        }
    }

    fn directory(players: &[(&str, &str)]) -> PlayerDirectory {
        PlayerDirectory::from_records(players.iter().map(|(id, name)| {
            (
                id.to_string(),
                PlayerRecord {
                    full_name: Some(name.to_string()),
                    ..Default::default()
                },
            )
        }))
    }

    fn two_team_league() -> (Vec<User>, Vec<Roster>, Vec<MatchupEntry>) {
        let users = vec![
            user("U1", "alice", Some("Air Raid")),
            user("U2", "bob", None),
        ];
        let rosters = vec![roster(1, Some("U1")), roster(2, Some("U2"))];
        let entries = vec![
            entry(1, Some(7), &["P1"], &["P1", "P2"], &[("P1", 30.0), ("P2", 20.0)]),
            entry(2, Some(7), &["P3"], &["P3"], &[("P3", 40.0)]),
        ];
        (users, rosters, entries)
    }

    #[test]
    fn test_single_matchup_with_resolved_names() {
        let (users, rosters, entries) = two_team_league();
        let directory = directory(&[("P1", "Player One"), ("P2", "Player Two"), ("P3", "Player Three")]);

        let board = build_scoreboard(3, &users, &rosters, &entries, &directory);

        assert_eq!(board.len(), 1);
        let matchup = &board[0];
        assert_eq!(matchup.matchup_id, Some(7));
        assert_eq!(matchup.week, 3);
        assert_eq!(matchup.entries.len(), 2);

        let first = &matchup.entries[0];
        assert_eq!(first.user_name, "alice");
        assert_eq!(first.team_name, "Air Raid");
        assert_eq!(first.user_id.as_deref(), Some("U1"));
        assert_eq!(first.starters, vec!["Player One"]);
        assert_eq!(first.players, vec!["Player One", "Player Two"]);
        assert_eq!(first.points, 50.0);
        assert_eq!(first.players_points.len(), 2);
        assert_eq!(first.players_points["Player Two"], 20.0);
        assert_eq!(first.starters_points.len(), 1);
        assert_eq!(first.starters_points["Player One"], 30.0);

        let second = &matchup.entries[1];
        assert_eq!(second.user_name, "bob");
        assert_eq!(second.team_name, "");
        assert_eq!(second.players, vec!["Player Three"]);
        assert_eq!(second.starters_points["Player Three"], 40.0);
    }

    #[test]
    fn test_unknown_players_keep_raw_ids() {
        let (users, rosters, entries) = two_team_league();

        let board = build_scoreboard(3, &users, &rosters, &entries, &PlayerDirectory::default());

        let first = &board[0].entries[0];
        assert_eq!(first.starters, vec!["P1"]);
        assert_eq!(first.players, vec!["P1", "P2"]);
        assert_eq!(first.starters_points.len(), 1);
        assert_eq!(first.starters_points["P1"], 30.0);
        assert!(!first.starters_points.contains_key("P2"));
    }

    #[test]
    fn test_missing_owner_gives_empty_names() {
        let (users, mut rosters, entries) = two_team_league();
        rosters[1].owner_id = Some("GHOST".to_string());

        let board = build_scoreboard(3, &users, &rosters, &entries, &PlayerDirectory::default());

        let entries = &board[0].entries;
        assert_eq!(entries[0].user_name, "alice");
        assert_eq!(entries[1].user_name, "");
        assert_eq!(entries[1].team_name, "");
        assert_eq!(entries[1].user_id.as_deref(), Some("GHOST"));
    }

    #[test]
    fn test_missing_roster_gives_empty_names() {
        let (users, rosters, mut entries) = two_team_league();
        entries[0].roster_id = 99;

        let board = build_scoreboard(3, &users, &rosters, &entries, &PlayerDirectory::default());

        let first = &board[0].entries[0];
        assert_eq!(first.roster_id, 99);
        assert_eq!(first.user_name, "");
        assert_eq!(first.team_name, "");
        assert!(first.user_id.is_none());
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let users = vec![];
        let rosters = vec![];
        let entries = vec![
            entry(1, Some(3), &[], &[], &[]),
            entry(2, Some(1), &[], &[], &[]),
            entry(3, Some(3), &[], &[], &[]),
            entry(4, Some(2), &[], &[], &[]),
            entry(5, Some(1), &[], &[], &[]),
            entry(6, Some(2), &[], &[], &[]),
        ];

        let board = build_scoreboard(1, &users, &rosters, &entries, &PlayerDirectory::default());

        let order: Vec<Option<u32>> = board.iter().map(|m| m.matchup_id).collect();
        assert_eq!(order, vec![Some(3), Some(1), Some(2)]);
        let rosters_in_first: Vec<u32> = board[0].entries.iter().map(|e| e.roster_id).collect();
        assert_eq!(rosters_in_first, vec![1, 3]);
    }

    #[test]
    fn test_entries_without_matchup_id_share_a_group() {
        let entries = vec![
            entry(1, None, &[], &[], &[]),
            entry(2, Some(1), &[], &[], &[]),
            entry(3, None, &[], &[], &[]),
        ];

        let board = build_scoreboard(15, &[], &[], &entries, &PlayerDirectory::default());

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].matchup_id, None);
        assert_eq!(board[0].entries.len(), 2);
        assert!(board.iter().all(|m| m.week == 15));
    }

    #[test]
    fn test_no_entries_gives_empty_scoreboard() {
        let (users, rosters, _) = two_team_league();
        let board = build_scoreboard(1, &users, &rosters, &[], &PlayerDirectory::default());
        assert!(board.is_empty());
    }
}
