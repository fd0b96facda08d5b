// Session resolution and the Principal extractor
// Decision: Support both cookie-based (browser) and header-based (API) session tokens
// Decision: Resolution happens once, when the stream is opened; the principal is then fixed

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use super::{config::AuthConfig, jwt::JwtService};
use crate::api::ApiError;

/// Authenticated principal a stream is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// User email; every stream query filters on it
    pub email: String,
    /// Display name, when the session carries one
    pub name: Option<String>,
}

/// Resolves the session attached to a request.
///
/// `Ok(None)` means no usable session (HTTP 401). `Err` means the resolver
/// itself failed (HTTP 500).
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> anyhow::Result<Option<Principal>>;
}

/// Resolves sessions from HS256 JWTs in the Authorization header or session cookie
pub struct JwtSessionResolver {
    jwt: JwtService,
    cookie_name: String,
}

impl JwtSessionResolver {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            jwt: JwtService::new(config.jwt.clone()),
            cookie_name: config.cookie_name.clone(),
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        // Authorization header first
        if let Some(value) = headers.get(header::AUTHORIZATION) {
            if let Some(token) = value
                .to_str()
                .ok()
                .and_then(|s| s.strip_prefix("Bearer "))
            {
                return Some(token.trim().to_string());
            }
        }

        // Then the session cookie (EventSource cannot set headers)
        let jar = CookieJar::from_headers(headers);
        jar.get(&self.cookie_name).map(|c| c.value().to_string())
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> anyhow::Result<Option<Principal>> {
        let Some(token) = self.token_from_headers(headers) else {
            return Ok(None);
        };

        let claims = match self.jwt.validate_session_token(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Session token rejected: {:#}", e);
                return Ok(None);
            }
        };

        let email = claims.sub.trim();
        if email.is_empty() {
            return Ok(None);
        }

        Ok(Some(Principal {
            email: email.to_string(),
            name: claims.name,
        }))
    }
}

/// Extractor for the authenticated principal
/// This is required - returns 401 if not authenticated
#[axum::async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    Arc<dyn SessionResolver>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let resolver = <Arc<dyn SessionResolver> as FromRef<S>>::from_ref(state);
        match resolver.resolve(&parts.headers).await {
            Ok(Some(principal)) => Ok(principal),
            Ok(None) => Err(ApiError::Unauthenticated),
            Err(e) => Err(ApiError::Setup(e.context("Session resolution failed"))),
        }
    }
}
