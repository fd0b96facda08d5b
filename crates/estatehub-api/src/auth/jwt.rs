// JWT session tokens
// Decision: Use HS256 algorithm for simplicity (symmetric key shared with the marketplace app)
// Decision: The subject is the user's email; it is the principal every stream query filters on

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::config::JwtConfig;

/// JWT claims for session tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user email)
    pub sub: String,
    /// Display name, if the issuer included one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT service for session token validation (and minting, for tooling and tests)
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a session token for a user
    pub fn issue_session_token(&self, email: &str, name: Option<&str>) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.session_token_lifetime)?;

        let claims = SessionClaims {
            sub: email.to_string(),
            name: name.map(str::to_string),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode session token")
    }

    /// Validate and decode a session token
    pub fn validate_session_token(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .context("Invalid session token")?;

        Ok(token_data.claims)
    }
}
