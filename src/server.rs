//! HTTP surface using Axum
//!
//! One GET route per query operation. Errors become a JSON body of the form
//! `{"error": kind, "message": text}` with a status that reflects the failure.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app::{App, AppError};
use crate::data::{FetchError, Matchup};

/// Create the router over a shared App
pub fn create_router(app: App) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/nfl/state", get(nfl_state_handler))
        .route("/players/id", get(player_id_handler))
        .route("/players/:player_id/name", get(player_name_handler))
        .route("/leagues/:league_id/rosters", get(rosters_handler))
        .route("/leagues/:league_id/users", get(users_handler))
        .route("/leagues/:league_id/matchups/:week", get(matchups_handler))
        .route("/leagues/:league_id/scoreboard/:week", get(scoreboard_handler))
        .with_state(app)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(app: App, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(app)).await
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, extra) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", Value::Null),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation", Value::Null),
            AppError::Upstream(FetchError::Status { status, .. }) => {
                (StatusCode::BAD_GATEWAY, "upstream", json!(status))
            }
            AppError::Upstream(e @ (FetchError::Transport(_) | FetchError::TimedOut(_))) => {
                let status = if e.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (status, "transport", Value::Null)
            }
            AppError::Upstream(FetchError::Decode { .. }) => {
                (StatusCode::BAD_GATEWAY, "decode", Value::Null)
            }
        };

        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }

        let mut body = json!({ "error": kind, "message": self.to_string() });
        if !extra.is_null() {
            body["upstream_status"] = extra;
        }
        (status, Json(body)).into_response()
    }
}

async fn health_handler(State(app): State<App>) -> Json<Value> {
    let players = app.directory().len();
    let status = if players > 0 { "ok" } else { "degraded" };
    let cache = app.client().cache();
    Json(json!({
        "status": status,
        "players": players,
        "cache_entries": cache.len(),
        "cache_capacity": cache.capacity(),
        "cache_ttl_secs": cache.ttl().as_secs(),
    }))
}

async fn nfl_state_handler(State(app): State<App>) -> Result<Json<Value>, AppError> {
    Ok(Json(app.get_nfl_state().await?))
}

#[derive(Debug, Deserialize)]
struct PlayerIdQuery {
    name: Option<String>,
}

async fn player_id_handler(
    State(app): State<App>,
    Query(query): Query<PlayerIdQuery>,
) -> Result<Json<Value>, AppError> {
    let name = query.name.unwrap_or_default();
    let player_id = app.get_player_id(&name)?;
    Ok(Json(json!({ "player_id": player_id })))
}

async fn player_name_handler(
    State(app): State<App>,
    Path(player_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let full_name = app.get_player_name(&player_id)?;
    Ok(Json(json!({ "full_name": full_name })))
}

async fn rosters_handler(
    State(app): State<App>,
    Path(league_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(app.get_league_rosters(&league_id).await?))
}

async fn users_handler(
    State(app): State<App>,
    Path(league_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(app.get_league_users(&league_id).await?))
}

async fn matchups_handler(
    State(app): State<App>,
    Path((league_id, week)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(app.get_league_matchups(&league_id, &week).await?))
}

async fn scoreboard_handler(
    State(app): State<App>,
    Path((league_id, week)): Path<(String, String)>,
) -> Result<Json<Vec<Matchup>>, AppError> {
    Ok(Json(app.get_matchup_scoreboard(&league_id, &week).await?))
}
