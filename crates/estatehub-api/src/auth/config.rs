// Session configuration loaded from environment variables.
// Decision: Follow the AUTH_ prefix convention for all auth config
// Decision: Sessions are issued by the marketplace app; this service only validates them

use std::time::Duration;

pub const DEFAULT_COOKIE_NAME: &str = "session_token";

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs (HS256)
    pub secret: String,
    /// Session token lifetime (used when minting tokens)
    pub session_token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            session_token_lifetime: Duration::from_secs(24 * 60 * 60), // 1 day
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Cookie that carries the session token for browser clients
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let secret = std::env::var("AUTH_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!(
                    "AUTH_JWT_SECRET not set, generating a random secret (tokens will not survive restarts)"
                );
                use rand::Rng;
                let bytes: [u8; 32] = rand::thread_rng().gen();
                hex::encode(bytes)
            });

        let session_token_lifetime = std::env::var("AUTH_SESSION_TOKEN_LIFETIME")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(24 * 60 * 60));

        let cookie_name = std::env::var("AUTH_COOKIE_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());

        Self {
            jwt: JwtConfig {
                secret,
                session_token_lifetime,
            },
            cookie_name,
        }
    }

    /// Config with a fixed secret (tests and local tooling)
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt: JwtConfig {
                secret: secret.into(),
                ..JwtConfig::default()
            },
            ..Self::default()
        }
    }
}
