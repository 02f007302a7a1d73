//! sleeperboard - scoreboard service for Sleeper fantasy football leagues
//!
//! Loads the player directory, then serves the query operations over HTTP.

use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sleeperboard::app::App;
use sleeperboard::cache::ResponseCache;
use sleeperboard::cli::{Cli, ServerConfig};
use sleeperboard::data::{PlayerDirectory, UpstreamClient};
use sleeperboard::server;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match ServerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };
    init_logging();

    info!(
        base_url = %config.upstream.base_url,
        cache_capacity = config.cache_capacity.get(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "starting sleeperboard"
    );

    let cache = Arc::new(ResponseCache::new(config.cache_capacity, config.cache_ttl));
    let client = Arc::new(UpstreamClient::new(config.upstream.clone(), cache)?);
    let directory = Arc::new(PlayerDirectory::load(&config.snapshot, &client).await);

    let app = App::new(directory, client);
    server::serve(app, config.listen).await?;

    Ok(())
}
