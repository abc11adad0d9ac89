//! Outward-facing service clients.

pub mod recommender;

pub use recommender::{RecommenderClient, UpstreamReply};
