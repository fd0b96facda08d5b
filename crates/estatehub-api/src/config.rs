// Server configuration loaded from environment variables.
// Decision: DATABASE_URL unset selects the in-memory backend (dev mode)
// Decision: API routes are nested under API_PREFIX (default "/api"); /health and the OpenAPI doc are not

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9000";
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; None runs against in-memory storage
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub api_prefix: String,
    /// Interval between SSE keep-alive comments
    pub keep_alive: Duration,
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("Invalid BIND_ADDR")?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let run_migrations = std::env::var("DATABASE_RUN_MIGRATIONS")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let api_prefix = normalize_prefix(
            &std::env::var("API_PREFIX").unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string()),
        );

        let keep_alive = std::env::var("STREAM_KEEP_ALIVE_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(15));

        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            bind_addr,
            database_url,
            max_connections,
            run_migrations,
            api_prefix,
            keep_alive,
            log_format,
        })
    }
}

/// Trim trailing slashes and ensure a leading one. Empty (or "/") means no prefix.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix(" /v2/api/ "), "/v2/api");
    }
}
