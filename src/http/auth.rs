//! Admin authorization
//!
//! Admin routes take an [`Admin`] extractor. The caller sends
//! `Authorization: Bearer <token>` on every request and it is compared with
//! the configured admin token.

use super::error::ApiError;
use super::HttpState;
use crate::error::LeagueError;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

/// Proof that the request carried the admin token
#[derive(Debug, Clone, Copy)]
pub struct Admin;

impl FromRequestParts<HttpState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HttpState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            return Err(LeagueError::AdminDisabled.into());
        };

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        match presented {
            Some(token) if tokens_match(token, expected) => Ok(Admin),
            _ => {
                warn!("Rejected admin request to {}", parts.uri.path());
                Err(LeagueError::Unauthorized.into())
            }
        }
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Compare without stopping at the first differing byte
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
