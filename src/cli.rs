//! Command-line and environment configuration for sleeperboard
//!
//! Every setting can be given as a flag or through the environment; the
//! parsed arguments are checked and turned into a [`ServerConfig`].

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::cache::SnapshotStore;
use crate::data::client::UpstreamConfig;

/// Error types for configuration checks
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting that must be positive was zero
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    /// The base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),

    /// No snapshot path was given and no cache directory could be found
    #[error("No cache directory available; pass --snapshot-path")]
    NoSnapshotLocation,
}

/// sleeperboard - Sleeper fantasy football scoreboard service
#[derive(Parser, Debug)]
#[command(name = "sleeperboard")]
#[command(about = "Read-only scoreboard facade over the Sleeper API")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "SLEEPERBOARD_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds a cached upstream response stays fresh
    #[arg(long, env = "SLEEPERBOARD_CACHE_TTL_SECS", default_value_t = 30)]
    pub cache_ttl_secs: u64,

    /// Maximum number of cached upstream responses
    #[arg(long, env = "SLEEPERBOARD_CACHE_CAPACITY", default_value_t = 1000)]
    pub cache_capacity: usize,

    /// Seconds before an upstream call is abandoned
    #[arg(long, env = "SLEEPERBOARD_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Seconds before the bulk player download is abandoned
    #[arg(long, env = "SLEEPERBOARD_SNAPSHOT_TIMEOUT_SECS", default_value_t = 120)]
    pub snapshot_timeout_secs: u64,

    /// Maximum upstream calls in flight at once
    #[arg(long, env = "SLEEPERBOARD_MAX_IN_FLIGHT", default_value_t = 32)]
    pub max_in_flight: usize,

    /// Sleeper API base URL
    #[arg(long, env = "SLEEPERBOARD_BASE_URL", default_value = crate::data::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Where the bulk player snapshot is persisted
    ///
    /// Defaults to players_nfl.json in the user cache directory.
    #[arg(long, env = "SLEEPERBOARD_SNAPSHOT_PATH", value_name = "FILE")]
    pub snapshot_path: Option<PathBuf>,
}

/// Checked configuration for a server run
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub cache_capacity: NonZeroUsize,
    pub cache_ttl: Duration,
    pub upstream: UpstreamConfig,
    pub snapshot: SnapshotStore,
}

impl ServerConfig {
    /// Creates a ServerConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(ServerConfig)` with every setting checked
    /// * `Err(ConfigError)` if a setting is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let cache_capacity =
            NonZeroUsize::new(cli.cache_capacity).ok_or(ConfigError::Zero("cache capacity"))?;
        if cli.request_timeout_secs == 0 {
            return Err(ConfigError::Zero("request timeout"));
        }
        if cli.snapshot_timeout_secs == 0 {
            return Err(ConfigError::Zero("snapshot timeout"));
        }
        if cli.max_in_flight == 0 {
            return Err(ConfigError::Zero("max in-flight requests"));
        }

        let base_url = cli.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(cli.base_url.clone()));
        }

        let snapshot = match &cli.snapshot_path {
            Some(path) => SnapshotStore::with_path(path.clone()),
            None => SnapshotStore::new().ok_or(ConfigError::NoSnapshotLocation)?,
        };

        Ok(ServerConfig {
            listen: SocketAddr::new(cli.host, cli.port),
            cache_capacity,
            cache_ttl: Duration::from_secs(cli.cache_ttl_secs),
            upstream: UpstreamConfig {
                base_url: base_url.to_string(),
                request_timeout: Duration::from_secs(cli.request_timeout_secs),
                snapshot_timeout: Duration::from_secs(cli.snapshot_timeout_secs),
                max_in_flight: cli.max_in_flight,
            },
            snapshot,
        })
    }
}
