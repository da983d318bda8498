use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;

use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::repositories::UserRepository;
use crate::domain::users::{Gender, NewUser, User};
use crate::infrastructure::database::DatabasePool;

const USER_COLUMNS: &str =
    "id, username, password_hash, nickname, avatar, email, phone, gender, bio, created_at";

#[derive(Clone)]
pub struct SqlUserRepository {
    pool: DatabasePool,
}

impl SqlUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: UserRecord) -> User {
        User {
            id: UserId::new(record.id),
            username: record.username,
            password_hash: record.password_hash,
            nickname: record.nickname,
            avatar: record.avatar,
            email: record.email,
            phone: record.phone,
            gender: Gender::from_str(&record.gender).unwrap_or_default(),
            bio: record.bio,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (username, password_hash, nickname, gender, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(Gender::default().as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict("A user with this username already exists");
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Ok(Self::into_domain(record))
    }

    async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let record =
            query_as::<_, UserRecord>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(i64::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        record.map(Self::into_domain).ok_or(RepositoryError::NotFound)
    }

    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        record.map(Self::into_domain).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    password_hash: String,
    nickname: String,
    avatar: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    gender: String,
    bio: Option<String>,
    created_at: DateTime<Utc>,
}
