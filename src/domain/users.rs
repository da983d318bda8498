use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;
use crate::domain::ids::UserId;

pub const MIN_USERNAME_CHARS: usize = 2;
pub const MAX_USERNAME_CHARS: usize = 50;
pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MAX_NICKNAME_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Default)]
pub enum Gender {
    #[serde(rename = "男")]
    Male,
    #[serde(rename = "女")]
    Female,
    #[default]
    #[serde(rename = "保密")]
    Undisclosed,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
            Gender::Undisclosed => "保密",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "男" => Ok(Gender::Male),
            "女" => Ok(Gender::Female),
            "保密" => Ok(Gender::Undisclosed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Gender,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
}

/// The identity block returned alongside a fresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub nickname: String,
    pub avatar: Option<String>,
}

/// Returned from registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub username: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Gender,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            nickname: user.nickname,
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            nickname: user.nickname,
            avatar: user.avatar,
            email: user.email,
            phone: user.phone,
            gender: user.gender,
            bio: user.bio,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl Registration {
    /// Trim the username and nickname, then check length rules. A blank
    /// nickname is treated as absent.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.username = self.username.trim().to_string();
        self.nickname = self
            .nickname
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let username_chars = self.username.chars().count();
        if username_chars == 0 {
            return Err(ValidationError::new("用户名不能为空"));
        }
        if username_chars < MIN_USERNAME_CHARS {
            return Err(ValidationError::new("用户名至少2个字符"));
        }
        if username_chars > MAX_USERNAME_CHARS {
            return Err(ValidationError::new("用户名最多50个字符"));
        }

        validate_password(&self.password)?;

        if let Some(nickname) = &self.nickname
            && nickname.chars().count() > MAX_NICKNAME_CHARS
        {
            return Err(ValidationError::new("昵称最多50个字符"));
        }

        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.username = self.username.trim().to_string();
        if self.username.is_empty() {
            return Err(ValidationError::new("用户名不能为空"));
        }
        validate_password(&self.password)?;
        Ok(self)
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("密码不能为空"));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::new("密码不能少于6位"));
    }
    Ok(())
}
