//! Vantage - activity dashboard gateway
//!
//! Serves per-user activity records and content recommendations to a
//! browser dashboard, fronting a MongoDB document store.
//!
//! ## Services
//!
//! - **Activity pipeline**: recent interaction windows joined against
//!   video metadata under a 10-value equality-set query cap
//! - **Live feed**: change-stream-driven joined snapshots over WebSocket,
//!   with first-class cancellation
//! - **Category insights**: full-collection category counts behind a
//!   persistent freshness (TTL) cache
//! - **Recommendations**: verbatim proxy to the upstream retrieval service

pub mod activity;
pub mod cache;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, VantageError};
