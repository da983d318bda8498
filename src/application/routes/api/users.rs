use axum::extract::State;

use crate::application::auth::AuthenticatedUser;
use crate::application::envelope::Envelope;
use crate::application::errors::ApiError;
use crate::application::routes::support::{JsonBody, PathParam};
use crate::application::state::AppState;
use crate::domain::ids::UserId;
use crate::domain::users::{RegisteredUser, Registration, UserProfile};

#[tracing::instrument(skip(state, registration), fields(username = %registration.username))]
pub(crate) async fn register(
    State(state): State<AppState>,
    JsonBody(registration): JsonBody<Registration>,
) -> Result<Envelope<RegisteredUser>, ApiError> {
    let user = state.account_service.register(registration).await?;
    Ok(Envelope::with_message("注册成功", user))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Envelope<UserProfile>, ApiError> {
    let profile = state.account_service.profile(auth_user.id).await?;
    Ok(Envelope::ok(profile))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<UserId>,
) -> Result<Envelope<UserProfile>, ApiError> {
    let profile = state.account_service.profile(id).await?;
    Ok(Envelope::ok(profile))
}
