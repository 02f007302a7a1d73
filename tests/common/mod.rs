//! Shared helpers for integration tests: a local stand-in for the Sleeper API

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sleeperboard::app::App;
use sleeperboard::cache::ResponseCache;
use sleeperboard::data::client::UpstreamConfig;
use sleeperboard::data::{PlayerDirectory, PlayerRecord, UpstreamClient};

/// League whose users endpoint answers HTTP 500
pub const BROKEN_LEAGUE: &str = "500500";

/// League whose endpoints all respond normally
pub const LEAGUE: &str = "1048313545995296768";

/// Counts requests reaching the fake upstream
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Starts the fake upstream on an ephemeral port and returns its base URL
pub async fn spawn_fake_upstream() -> (String, Hits) {
    let hits = Hits::default();
    let router = Router::new()
        .route("/state/nfl", get(nfl_state))
        .route("/league/:league/users", get(users))
        .route("/league/:league/rosters", get(rosters))
        .route("/league/:league/matchups/:week", get(matchups))
        .route("/players/nfl", get(players))
        .route("/slow", get(slow))
        .route("/html", get(html))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    (format!("http://{}", addr), hits)
}

/// How long the fake upstream takes to serve the player snapshot
pub const PLAYERS_DELAY: Duration = Duration::from_millis(500);

/// Client against `base_url` with a fresh cache
pub fn client_for(base_url: &str, timeout: Duration) -> UpstreamClient {
    client_with(UpstreamConfig {
        base_url: base_url.to_string(),
        request_timeout: timeout,
        max_in_flight: 8,
        ..Default::default()
    })
}

pub fn client_with(config: UpstreamConfig) -> UpstreamClient {
    UpstreamClient::new(config, Arc::new(ResponseCache::default())).expect("client should build")
}

/// Directory knowing the players used by the fixture league, except P2
pub fn fixture_directory() -> PlayerDirectory {
    PlayerDirectory::from_records(
        [("P1", "Patrick Mahomes"), ("P3", "Justin Jefferson")]
            .into_iter()
            .map(|(id, name)| {
                (
                    id.to_string(),
                    PlayerRecord {
                        full_name: Some(name.to_string()),
                        ..Default::default()
                    },
                )
            }),
    )
}

/// App wired to the fake upstream
pub fn app_for(base_url: &str) -> App {
    App::new(
        Arc::new(fixture_directory()),
        Arc::new(client_for(base_url, Duration::from_secs(5))),
    )
}

fn hit(hits: &Hits) {
    hits.0.fetch_add(1, Ordering::SeqCst);
}

async fn nfl_state(State(hits): State<Hits>) -> Json<Value> {
    hit(&hits);
    Json(json!({"week": 5, "season": "2025", "season_type": "regular", "display_week": 5}))
}

async fn users(State(hits): State<Hits>, Path(league): Path<String>) -> impl IntoResponse {
    hit(&hits);
    if league == BROKEN_LEAGUE {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!([
        {"user_id": "U1", "display_name": "alice", "metadata": {"team_name": "Air Raid"}},
        {"user_id": "U2", "display_name": "bob", "metadata": {}}
    ]))
    .into_response()
}

async fn rosters(State(hits): State<Hits>) -> Json<Value> {
    hit(&hits);
    Json(json!([
        {"roster_id": 1, "owner_id": "U1", "players": ["P1", "P2"], "starters": ["P1"]},
        {"roster_id": 2, "owner_id": "U2", "players": ["P3"], "starters": ["P3"]},
        {"roster_id": 3, "owner_id": "U404", "players": ["P4"], "starters": ["P4"]}
    ]))
}

async fn matchups(State(hits): State<Hits>, Path((_league, week)): Path<(String, u32)>) -> Json<Value> {
    hit(&hits);
    if week != 3 {
        return Json(json!([]));
    }
    Json(json!([
        {
            "roster_id": 1, "matchup_id": 7, "points": 50.0,
            "starters": ["P1"], "players": ["P1", "P2"],
            "players_points": {"P1": 30.0, "P2": 20.0}
        },
        {
            "roster_id": 3, "matchup_id": 2, "points": 12.0,
            "starters": ["P4"], "players": ["P4"],
            "players_points": {"P4": 12.0}
        },
        {
            "roster_id": 2, "matchup_id": 7, "points": 40.0,
            "starters": ["P3"], "players": ["P3"],
            "players_points": {"P3": 40.0}
        }
    ]))
}

async fn players(State(hits): State<Hits>) -> &'static str {
    hit(&hits);
    tokio::time::sleep(PLAYERS_DELAY).await;
    r#"{"P1": {"full_name": "Patrick Mahomes", "team": "KC", "status": "Active"}, "P3": {"full_name": "Justin Jefferson", "team": "MIN", "status": "Active"}}"#
}

async fn slow(State(hits): State<Hits>) -> Json<Value> {
    hit(&hits);
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"late": true}))
}

async fn html(State(hits): State<Hits>) -> &'static str {
    hit(&hits);
    "<html>maintenance</html>"
}
