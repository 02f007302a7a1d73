//! sleeperboard library
//!
//! Read-only facade over the Sleeper fantasy football API: a player id/name
//! directory, a TTL/LRU response cache, the upstream client, and the
//! scoreboard join, exposed over HTTP.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod server;
