use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, query, query_as, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::books::BookStatus;
use crate::domain::ids::{BookId, ChapterId, ReadingRecordId, UserId};
use crate::domain::listing::{Page, PageRequest};
use crate::domain::reading_records::{
    BookProgress, ReadingHistoryEntry, ReadingRecord, SavedRecord, UpsertReadingRecord,
};
use crate::domain::repositories::ReadingRecordRepository;
use crate::infrastructure::database::DatabasePool;

const RECORD_COLUMNS: &str = "id, user_id, book_id, chapter_id, progress, last_read_at";

const PROGRESS_SELECT: &str = r"SELECT rr.id, rr.book_id, rr.chapter_id, ch.title AS chapter_title,
              ch.order_num AS chapter_order_num, rr.progress, rr.last_read_at
       FROM reading_records rr
       JOIN chapters ch ON ch.id = rr.chapter_id";

#[derive(Clone)]
pub struct SqlReadingRecordRepository {
    pool: DatabasePool,
}

impl SqlReadingRecordRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: RecordRow) -> ReadingRecord {
        ReadingRecord {
            id: ReadingRecordId::new(record.id),
            user_id: UserId::new(record.user_id),
            book_id: BookId::new(record.book_id),
            chapter_id: ChapterId::new(record.chapter_id),
            progress: record.progress,
            last_read_at: record.last_read_at,
        }
    }

    fn into_progress(record: ProgressRow) -> BookProgress {
        BookProgress {
            id: ReadingRecordId::new(record.id),
            book_id: BookId::new(record.book_id),
            chapter_id: ChapterId::new(record.chapter_id),
            chapter_title: record.chapter_title,
            chapter_order_num: record.chapter_order_num,
            progress: record.progress,
            last_read_at: record.last_read_at,
        }
    }
}

#[async_trait]
impl ReadingRecordRepository for SqlReadingRecordRepository {
    async fn list_by_user(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> Result<Page<ReadingHistoryEntry>, RepositoryError> {
        let total: i64 = query_scalar("SELECT COUNT(*) FROM reading_records WHERE user_id = ?")
            .bind(i64::from(user_id))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let records = query_as::<_, HistoryRow>(
            r"SELECT rr.id, rr.book_id, b.title AS book_title, b.author, b.cover,
                     b.chapter_count, b.status AS book_status, rr.chapter_id,
                     ch.title AS chapter_title, ch.order_num AS chapter_order_num,
                     rr.progress, rr.last_read_at
              FROM reading_records rr
              JOIN books b ON b.id = rr.book_id
              JOIN chapters ch ON ch.id = rr.chapter_id
              WHERE rr.user_id = ?
              ORDER BY rr.last_read_at DESC, rr.id DESC
              LIMIT ? OFFSET ?",
        )
        .bind(i64::from(user_id))
        .bind(i64::from(request.limit()))
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let items = records
            .into_iter()
            .map(|r| ReadingHistoryEntry {
                id: ReadingRecordId::new(r.id),
                book_id: BookId::new(r.book_id),
                book_title: r.book_title,
                author: r.author,
                cover: r.cover,
                chapter_count: r.chapter_count,
                book_status: BookStatus::from_str(&r.book_status).unwrap_or_default(),
                chapter_id: ChapterId::new(r.chapter_id),
                chapter_title: r.chapter_title,
                chapter_order_num: r.chapter_order_num,
                progress: r.progress,
                last_read_at: r.last_read_at,
            })
            .collect();

        Ok(Page::new(items, request, total as u64))
    }

    async fn get_for_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<BookProgress>, RepositoryError> {
        let record = query_as::<_, ProgressRow>(&format!(
            "{PROGRESS_SELECT} WHERE rr.user_id = ? AND rr.book_id = ?"
        ))
        .bind(i64::from(user_id))
        .bind(i64::from(book_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(record.map(Self::into_progress))
    }

    async fn list_for_books(
        &self,
        user_id: UserId,
        book_ids: &[BookId],
    ) -> Result<Vec<BookProgress>, RepositoryError> {
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::new(PROGRESS_SELECT);
        qb.push(" WHERE rr.user_id = ")
            .push_bind(i64::from(user_id))
            .push(" AND rr.book_id IN (");
        let mut sep = qb.separated(", ");
        for id in book_ids {
            sep.push_bind(i64::from(*id));
        }
        sep.push_unseparated(")");

        let records = qb
            .build_query_as::<ProgressRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(Self::into_progress).collect())
    }

    async fn upsert(
        &self,
        user_id: UserId,
        record: UpsertReadingRecord,
    ) -> Result<SavedRecord, RepositoryError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        // The first statement must be a write so the transaction holds the
        // write lock from the start.
        let inserted = query_as::<_, RecordRow>(&format!(
            "INSERT INTO reading_records (user_id, book_id, chapter_id, progress, last_read_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (user_id, book_id) DO NOTHING \
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(i64::from(user_id))
        .bind(i64::from(record.book_id))
        .bind(i64::from(record.chapter_id))
        .bind(record.progress)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        let (row, created) = if let Some(row) = inserted {
            query("UPDATE books SET read_count = read_count + 1 WHERE id = ?")
                .bind(i64::from(record.book_id))
                .execute(&mut *tx)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
            (row, true)
        } else {
            let row = query_as::<_, RecordRow>(&format!(
                "UPDATE reading_records SET chapter_id = ?, progress = ?, last_read_at = ? \
                 WHERE user_id = ? AND book_id = ? RETURNING {RECORD_COLUMNS}"
            ))
            .bind(i64::from(record.chapter_id))
            .bind(record.progress)
            .bind(now)
            .bind(i64::from(user_id))
            .bind(i64::from(record.book_id))
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| {
                if let sqlx::Error::Database(db_err) = &err
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::NotFound;
                }
                RepositoryError::unexpected(err.to_string())
            })?;
            (row, false)
        };

        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(SavedRecord {
            record: Self::into_domain(row),
            created,
        })
    }

    async fn delete_for_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), RepositoryError> {
        let result = query("DELETE FROM reading_records WHERE user_id = ? AND book_id = ?")
            .bind(i64::from(user_id))
            .bind(i64::from(book_id))
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = query("DELETE FROM reading_records WHERE user_id = ?")
            .bind(i64::from(user_id))
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: i64,
    user_id: i64,
    book_id: i64,
    chapter_id: i64,
    progress: i64,
    last_read_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProgressRow {
    id: i64,
    book_id: i64,
    chapter_id: i64,
    chapter_title: String,
    chapter_order_num: i64,
    progress: i64,
    last_read_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    book_id: i64,
    book_title: String,
    author: String,
    cover: Option<String>,
    chapter_count: i64,
    book_status: String,
    chapter_id: i64,
    chapter_title: String,
    chapter_order_num: i64,
    progress: i64,
    last_read_at: DateTime<Utc>,
}
