//! Sleeper API client
//!
//! Performs the actual HTTP calls against the upstream API and classifies
//! failures. Every JSON call goes through the shared [`ResponseCache`]
//! (cache-aside); the bulk player snapshot bypasses it.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

use crate::cache::ResponseCache;

/// Base URL for the Sleeper API
pub const DEFAULT_BASE_URL: &str = "https://api.sleeper.app/v1";

/// Upper bound on a single upstream call, including time spent queued
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on the bulk player download
pub const DEFAULT_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default number of upstream calls allowed in flight at once
pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;

/// Longest upstream error body kept in a [`FetchError::Status`] message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Errors that can occur when calling the upstream API
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-success status
    #[error("upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never completed (DNS, connect, timeout, reset)
    #[error("transport failure reaching upstream: {0}")]
    Transport(#[from] reqwest::Error),

    /// The call, queueing included, did not finish within its deadline
    #[error("upstream call timed out after {0:?}")]
    TimedOut(Duration),

    /// Upstream answered 2xx but the body was not the expected JSON
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Whether this failure was a deadline firing
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::TimedOut(_) => true,
            FetchError::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Upstream resources this service reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// Current NFL week and season
    NflState,
    LeagueUsers(&'a str),
    LeagueRosters(&'a str),
    LeagueMatchups(&'a str, u32),
    /// Bulk dataset of every NFL player, keyed by player id
    Players,
}

impl Endpoint<'_> {
    /// Path relative to the API base URL
    pub fn path(&self) -> String {
        match self {
            Endpoint::NflState => "/state/nfl".to_string(),
            Endpoint::LeagueUsers(league) => format!("/league/{}/users", league),
            Endpoint::LeagueRosters(league) => format!("/league/{}/rosters", league),
            Endpoint::LeagueMatchups(league, week) => {
                format!("/league/{}/matchups/{}", league, week)
            }
            Endpoint::Players => "/players/nfl".to_string(),
        }
    }
}

/// Settings for [`UpstreamClient`]
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// API base URL without a trailing slash
    pub base_url: String,
    /// Deadline for every JSON call, from queueing to the last body byte
    pub request_timeout: Duration,
    /// Deadline for the bulk player download
    pub snapshot_timeout: Duration,
    /// Maximum simultaneous upstream calls
    pub max_in_flight: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            snapshot_timeout: DEFAULT_SNAPSHOT_TIMEOUT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

/// Client for the Sleeper API
///
/// Cheap to share behind an `Arc`; the HTTP connection pool, the response
/// cache and the in-flight limit are shared by every caller.
#[derive(Debug)]
pub struct UpstreamClient {
    http: Client,
    cache: Arc<ResponseCache>,
    base_url: String,
    in_flight: Semaphore,
    request_timeout: Duration,
    snapshot_timeout: Duration,
}

impl UpstreamClient {
    /// Creates a client with the given settings and shared cache
    pub fn new(config: UpstreamConfig, cache: Arc<ResponseCache>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("sleeperboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            cache,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            in_flight: Semaphore::new(config.max_in_flight.max(1)),
            request_timeout: config.request_timeout,
            snapshot_timeout: config.snapshot_timeout,
        })
    }

    /// The response cache this client populates
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Absolute URL for an endpoint
    pub fn url(&self, endpoint: Endpoint<'_>) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Fetches a JSON document, serving it from the cache when fresh
    ///
    /// # Returns
    /// * `Ok(Value)` - Parsed JSON body, from cache or network
    /// * `Err(FetchError)` - Non-2xx status, transport failure, timeout, or invalid JSON
    ///
    /// Failures are never cached and never retried. The request timeout
    /// covers waiting for an in-flight slot as well as the HTTP exchange.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        if let Some(hit) = self.cache.get(url) {
            debug!("cache hit");
            return Ok(hit);
        }
        debug!("cache miss");

        let body = self.get_text(url, self.request_timeout).await?;
        let value: Value = serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;

        self.cache.set(url, value.clone());
        Ok(value)
    }

    /// Fetches an endpoint as raw JSON
    pub async fn get_json(&self, endpoint: Endpoint<'_>) -> Result<Value, FetchError> {
        self.fetch(&self.url(endpoint)).await
    }

    /// Fetches a list endpoint and decodes its items
    ///
    /// Sleeper answers `null` for some empty collections; that decodes to an
    /// empty list.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint<'_>,
    ) -> Result<Vec<T>, FetchError> {
        let url = self.url(endpoint);
        let value = self.fetch(&url).await?;
        let items: Option<Vec<T>> =
            serde_json::from_value(value).map_err(|source| FetchError::Decode { url, source })?;
        Ok(items.unwrap_or_default())
    }

    /// Downloads the bulk player dataset as text, bypassing the cache
    ///
    /// Runs under the snapshot timeout rather than the per-call one; the body
    /// is tens of megabytes.
    #[instrument(skip(self))]
    pub async fn players_snapshot(&self) -> Result<String, FetchError> {
        self.get_text(&self.url(Endpoint::Players), self.snapshot_timeout)
            .await
    }

    /// Issues a GET and returns the body of a 2xx response
    ///
    /// `deadline` bounds the whole call: the wait for an in-flight permit,
    /// the request and the body read.
    async fn get_text(&self, url: &str, deadline: Duration) -> Result<String, FetchError> {
        match tokio::time::timeout(deadline, self.exchange(url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(url, ?deadline, "upstream call timed out");
                Err(FetchError::TimedOut(deadline))
            }
        }
    }

    async fn exchange(&self, url: &str) -> Result<String, FetchError> {
        // The semaphore is never closed, so a permit is always eventually granted
        let _permit = self.in_flight.acquire().await.ok();

        let response = self.http.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "upstream request failed");
            FetchError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(url, status = status.as_u16(), "upstream returned error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}
