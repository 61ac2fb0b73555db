//! Bearer-token verification and the authenticated caller extractor.

use super::error::ApiError;
use crate::task::domain::UserId;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Authenticated user.
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

/// Errors raised while verifying a bearer token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer` header was sent.
    #[error("missing bearer token")]
    MissingToken,
    /// The token failed signature, expiry or claim validation.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Verifies HS256 access tokens signed with a shared secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Creates a verifier for tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verifies `token` and returns the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] when the token is malformed,
    /// expired, or signed with another secret.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation)?;
        Ok(data.claims.user_id)
    }

    fn verify_header(&self, parts: &Parts) -> Result<UserId, AuthError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.verify(token)
    }
}

/// The authenticated user making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<S> FromRequestParts<S> for Caller
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<TokenVerifier>::from_ref(state);
        verifier.verify_header(parts).map(Self).map_err(|err| {
            tracing::debug!(error = %err, "request rejected");
            ApiError::Unauthorized
        })
    }
}
