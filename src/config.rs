//! Configuration for vantage
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Vantage - activity dashboard gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "vantage")]
#[command(about = "Serves per-user activity, video joins, and category insights to the dashboard")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "vantage")]
    pub mongodb_db: String,

    /// Category summary cache TTL in milliseconds
    #[arg(long, env = "CACHE_TTL_MS", default_value = "3600000")]
    pub cache_ttl_ms: u64,

    /// Directory for the persistent cache slot
    #[arg(long, env = "CACHE_DIR", default_value = "./vantage-cache")]
    pub cache_dir: PathBuf,

    /// Base URL of the upstream recommendation service
    /// When unset, /users/:id/recommendations returns 503
    #[arg(long, env = "RECOMMENDER_URL")]
    pub recommender_url: Option<String>,

    /// Enable development mode (tolerates a missing MongoDB at startup)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Cache TTL as a Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl_ms == 0 {
            return Err("CACHE_TTL_MS must be positive".to_string());
        }

        if let Some(ref url) = self.recommender_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("RECOMMENDER_URL must be an http(s) URL, got '{url}'"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["vantage"])
    }

    #[test]
    fn test_defaults_validate() {
        let args = base_args();
        assert!(args.validate().is_ok());
        assert_eq!(args.cache_ttl(), Duration::from_millis(3_600_000));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut args = base_args();
        args.cache_ttl_ms = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_recommender_url_scheme_checked() {
        let mut args = base_args();
        args.recommender_url = Some("ftp://reco.internal".to_string());
        assert!(args.validate().is_err());

        args.recommender_url = Some("https://reco.internal".to_string());
        assert!(args.validate().is_ok());
    }
}
