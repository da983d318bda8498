use std::sync::Arc;

use tracing::{info, warn};

use crate::application::errors::AppError;
use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::repositories::UserRepository;
use crate::domain::tokens::{LoginResponse, RefreshRequest, TokenKind, TokenPair};
use crate::domain::users::{
    Credentials, NewUser, RegisteredUser, Registration, UserProfile, UserSummary,
};
use crate::infrastructure::auth::{JwtKeys, hash_password, verify_password};

pub const BAD_CREDENTIALS_MESSAGE: &str = "用户名或密码错误";
pub const REFRESH_REJECTED_MESSAGE: &str = "Refresh token 已失效，请重新登录";
pub const USERNAME_TAKEN_MESSAGE: &str = "用户名已存在";
pub const USER_NOT_FOUND_MESSAGE: &str = "用户不存在";

/// Registration, login, token refresh and profile lookups.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    keys: Arc<JwtKeys>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, keys: Arc<JwtKeys>) -> Self {
        Self { users, keys }
    }

    pub async fn register(&self, registration: Registration) -> Result<RegisteredUser, AppError> {
        let registration = registration.validate()?;
        let password = registration.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|err| AppError::unexpected(format!("password hashing task failed: {err}")))?
            .map_err(|err| AppError::unexpected(format!("failed to hash password: {err}")))?;

        let nickname = registration
            .nickname
            .unwrap_or_else(|| registration.username.clone());
        let new_user = NewUser {
            username: registration.username,
            password_hash,
            nickname,
        };

        let user = self.users.insert(new_user).await.map_err(|err| match err {
            RepositoryError::Conflict(_) => AppError::conflict(USERNAME_TAKEN_MESSAGE),
            other => AppError::from(other),
        })?;

        info!(user_id = %user.id, username = %user.username, "registered user");
        Ok(user.into())
    }

    pub async fn login(&self, credentials: Credentials) -> Result<LoginResponse, AppError> {
        let credentials = credentials.validate()?;

        let user = match self.users.get_by_username(&credentials.username).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                return Err(AppError::unauthorized(BAD_CREDENTIALS_MESSAGE));
            }
            Err(err) => return Err(err.into()),
        };

        let password = credentials.password;
        let stored_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|err| AppError::unexpected(format!("password check task failed: {err}")))?;
        if !matches {
            warn!(username = %user.username, "failed login attempt");
            return Err(AppError::unauthorized(BAD_CREDENTIALS_MESSAGE));
        }

        let tokens = self
            .keys
            .issue_pair(user.id, &user.username)
            .map_err(|err| AppError::unexpected(format!("failed to issue tokens: {err}")))?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse {
            tokens,
            user: UserSummary::from(&user),
        })
    }

    /// Exchange a refresh token for a new pair. The user must still exist.
    pub async fn refresh(&self, request: RefreshRequest) -> Result<TokenPair, AppError> {
        let claims = self
            .keys
            .verify(request.refresh_token.trim(), TokenKind::Refresh)
            .map_err(|_| AppError::unauthorized(REFRESH_REJECTED_MESSAGE))?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized(REFRESH_REJECTED_MESSAGE))?;

        let user = match self.users.get(user_id).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                return Err(AppError::unauthorized(REFRESH_REJECTED_MESSAGE));
            }
            Err(err) => return Err(err.into()),
        };

        self.keys
            .issue_pair(user.id, &user.username)
            .map_err(|err| AppError::unexpected(format!("failed to issue tokens: {err}")))
    }

    pub async fn profile(&self, user_id: UserId) -> Result<UserProfile, AppError> {
        match self.users.get(user_id).await {
            Ok(user) => Ok(user.into()),
            Err(RepositoryError::NotFound) => Err(AppError::not_found(USER_NOT_FOUND_MESSAGE)),
            Err(err) => Err(err.into()),
        }
    }
}
