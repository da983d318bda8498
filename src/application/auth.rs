use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use tracing::{Span, debug};

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::ids::UserId;
use crate::domain::tokens::TokenKind;

pub const UNAUTHORIZED_MESSAGE: &str = "未登录或登录已过期";

/// Caller identity taken from a valid access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            Span::current().record("user.id", tracing::field::display(&user.id));
            return Ok(user.clone());
        }

        let token = bearer_token(parts).ok_or_else(unauthorized)?;

        let claims = state
            .jwt_keys
            .verify(token, TokenKind::Access)
            .map_err(|err| {
                debug!(error = %err, "rejected access token");
                unauthorized()
            })?;
        let id = claims.user_id().ok_or_else(unauthorized)?;

        let user = AuthenticatedUser {
            id,
            username: claims.username,
        };
        Span::current().record("user.id", tracing::field::display(&user.id));
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized() -> ApiError {
    AppError::unauthorized(UNAUTHORIZED_MESSAGE).into()
}
