//! Bearer-token authentication.
//!
//! Token issuance is external; this service only decodes and validates
//! HS256 JWTs carrying the caller's id and an admin flag. Handlers pull an
//! [`AuthContext`] out of the request; its absence is a 401 before any
//! handler logic runs.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use veridoc_core::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Caller id (owner id for every document operation).
    pub sub: String,
    /// Grants access to the administrative routes.
    #[serde(default)]
    pub admin: bool,
    pub exp: usize,
}

/// Authenticated caller identity, extracted per request.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub admin: bool,
}

impl AuthContext {
    /// Admin gate for the manual status route.
    pub fn require_admin(&self) -> Result<(), HttpAppError> {
        if self.admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrative access required".to_string()).into())
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;
    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Expected Bearer token".to_string()))
}

impl FromRequestParts<Arc<AppState>> for AuthContext {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Token subject is not a valid id".to_string()))?;

        Ok(AuthContext {
            user_id,
            admin: decoded.claims.admin,
        })
    }
}

/// Encode a token for the given caller. Shared with the integration tests;
/// production tokens come from the identity provider.
pub fn encode_token(secret: &str, user_id: Uuid, admin: bool, ttl_secs: u64) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        admin,
        exp: (chrono::Utc::now().timestamp() as usize) + ttl_secs as usize,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}
