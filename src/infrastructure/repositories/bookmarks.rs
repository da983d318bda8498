use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};

use crate::domain::RepositoryError;
use crate::domain::bookmarks::{Bookmark, ShelfEntry};
use crate::domain::books::BookStatus;
use crate::domain::ids::{BookId, BookmarkId, UserId};
use crate::domain::repositories::BookmarkRepository;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlBookmarkRepository {
    pool: DatabasePool,
}

impl SqlBookmarkRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: BookmarkRecord) -> Bookmark {
        Bookmark {
            id: BookmarkId::new(record.id),
            user_id: UserId::new(record.user_id),
            book_id: BookId::new(record.book_id),
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl BookmarkRepository for SqlBookmarkRepository {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<ShelfEntry>, RepositoryError> {
        let records = query_as::<_, ShelfRecord>(
            r"SELECT bm.id, bm.book_id, b.title, b.author, b.cover,
                     COALESCE(c.name, '') AS category, b.word_count, b.chapter_count,
                     b.status, bm.created_at AS added_at
              FROM bookmarks bm
              JOIN books b ON b.id = bm.book_id
              LEFT JOIN categories c ON c.id = b.category_id
              WHERE bm.user_id = ?
              ORDER BY bm.created_at DESC, bm.id DESC",
        )
        .bind(i64::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records
            .into_iter()
            .map(|r| ShelfEntry {
                id: BookmarkId::new(r.id),
                book_id: BookId::new(r.book_id),
                title: r.title,
                author: r.author,
                cover: r.cover,
                category: r.category,
                word_count: r.word_count,
                chapter_count: r.chapter_count,
                status: BookStatus::from_str(&r.status).unwrap_or_default(),
                added_at: r.added_at,
            })
            .collect())
    }

    async fn find(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<Bookmark>, RepositoryError> {
        let record = query_as::<_, BookmarkRecord>(
            "SELECT id, user_id, book_id, created_at FROM bookmarks WHERE user_id = ? AND book_id = ?",
        )
        .bind(i64::from(user_id))
        .bind(i64::from(book_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(record.map(Self::into_domain))
    }

    async fn add(&self, user_id: UserId, book_id: BookId) -> Result<Bookmark, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let record = query_as::<_, BookmarkRecord>(
            "INSERT INTO bookmarks (user_id, book_id, created_at) VALUES (?, ?, ?) \
             RETURNING id, user_id, book_id, created_at",
        )
        .bind(i64::from(user_id))
        .bind(i64::from(book_id))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                if db_err.is_unique_violation() {
                    return RepositoryError::conflict("Book is already on the shelf");
                }
                if db_err.is_foreign_key_violation() {
                    return RepositoryError::NotFound;
                }
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        query("UPDATE books SET collect_count = collect_count + 1 WHERE id = ?")
            .bind(i64::from(book_id))
            .execute(&mut *tx)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(Self::into_domain(record))
    }

    async fn remove(&self, user_id: UserId, book_id: BookId) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let result = query("DELETE FROM bookmarks WHERE user_id = ? AND book_id = ?")
            .bind(i64::from(user_id))
            .bind(i64::from(book_id))
            .execute(&mut *tx)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        // Counter never drops below zero even if it drifted out of sync.
        query("UPDATE books SET collect_count = MAX(collect_count - 1, 0) WHERE id = ?")
            .bind(i64::from(book_id))
            .execute(&mut *tx)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookmarkRecord {
    id: i64,
    user_id: i64,
    book_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ShelfRecord {
    id: i64,
    book_id: i64,
    title: String,
    author: String,
    cover: Option<String>,
    category: String,
    word_count: i64,
    chapter_count: i64,
    status: String,
    added_at: DateTime<Utc>,
}
