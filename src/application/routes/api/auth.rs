use axum::Json;
use axum::extract::State;

use crate::application::errors::ApiError;
use crate::application::routes::support::JsonBody;
use crate::application::state::AppState;
use crate::domain::tokens::{LoginResponse, RefreshRequest, TokenPair};
use crate::domain::users::Credentials;

/// Token responses are returned bare (no envelope); clients read
/// `access_token` and `refresh_token` from the top level.
#[tracing::instrument(skip(state, credentials), fields(username = %credentials.username))]
pub(crate) async fn login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = state.account_service.login(credentials).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(state, request))]
pub(crate) async fn refresh(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let tokens = state.account_service.refresh(request).await?;
    Ok(Json(tokens))
}
