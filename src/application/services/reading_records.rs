use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join;
use tracing::info;

use crate::application::auth::UNAUTHORIZED_MESSAGE;
use crate::application::errors::AppError;
use crate::application::services::bookmarks::BOOK_NOT_FOUND_MESSAGE;
use crate::domain::RepositoryError;
use crate::domain::ids::{BookId, UserId};
use crate::domain::listing::{Page, PageRequest};
use crate::domain::reading_records::{
    BookProgress, ReadingHistoryEntry, ReadingRecord, UpsertReadingRecord,
};
use crate::domain::repositories::{BookRepository, ChapterRepository, ReadingRecordRepository};

pub const CHAPTER_NOT_FOUND_MESSAGE: &str = "章节不存在";
pub const CHAPTER_BOOK_MISMATCH_MESSAGE: &str = "章节不属于该书籍";
pub const RECORD_NOT_FOUND_MESSAGE: &str = "阅读记录不存在";
pub const MAX_BATCH_BOOKS: usize = 100;

#[derive(Clone)]
pub struct ReadingRecordService {
    records: Arc<dyn ReadingRecordRepository>,
    books: Arc<dyn BookRepository>,
    chapters: Arc<dyn ChapterRepository>,
}

impl ReadingRecordService {
    pub fn new(
        records: Arc<dyn ReadingRecordRepository>,
        books: Arc<dyn BookRepository>,
        chapters: Arc<dyn ChapterRepository>,
    ) -> Self {
        Self {
            records,
            books,
            chapters,
        }
    }

    pub async fn history(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> Result<Page<ReadingHistoryEntry>, AppError> {
        Ok(self.records.list_by_user(user_id, request).await?)
    }

    pub async fn for_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<BookProgress>, AppError> {
        Ok(self.records.get_for_book(user_id, book_id).await?)
    }

    /// Progress for each requested book the user has started, keyed by book id.
    pub async fn for_books(
        &self,
        user_id: UserId,
        book_ids: &[BookId],
    ) -> Result<BTreeMap<BookId, BookProgress>, AppError> {
        if book_ids.len() > MAX_BATCH_BOOKS {
            return Err(AppError::validation(format!(
                "book_ids 最多{MAX_BATCH_BOOKS}个"
            )));
        }
        let mut unique = book_ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let records = self.records.list_for_books(user_id, &unique).await?;
        Ok(records.into_iter().map(|r| (r.book_id, r)).collect())
    }

    pub async fn save(
        &self,
        user_id: UserId,
        upsert: UpsertReadingRecord,
    ) -> Result<ReadingRecord, AppError> {
        let upsert = upsert.validate()?;

        let (book_exists, chapter) = join(
            self.books.exists(upsert.book_id),
            self.chapters.get(upsert.chapter_id),
        )
        .await;

        if !book_exists? {
            return Err(AppError::not_found(BOOK_NOT_FOUND_MESSAGE));
        }
        let chapter = match chapter {
            Ok(chapter) => chapter,
            Err(RepositoryError::NotFound) => {
                return Err(AppError::not_found(CHAPTER_NOT_FOUND_MESSAGE));
            }
            Err(err) => return Err(err.into()),
        };
        if chapter.book_id != upsert.book_id {
            return Err(AppError::validation(CHAPTER_BOOK_MISMATCH_MESSAGE));
        }

        let saved = self
            .records
            .upsert(user_id, upsert)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => AppError::unauthorized(UNAUTHORIZED_MESSAGE),
                other => AppError::from(other),
            })?;
        if saved.created {
            info!(%user_id, book_id = %saved.record.book_id, "started reading a new book");
        }
        Ok(saved.record)
    }

    pub async fn delete_for_book(&self, user_id: UserId, book_id: BookId) -> Result<(), AppError> {
        self.records
            .delete_for_book(user_id, book_id)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => AppError::not_found(RECORD_NOT_FOUND_MESSAGE),
                other => AppError::from(other),
            })
    }

    pub async fn clear(&self, user_id: UserId) -> Result<u64, AppError> {
        let removed = self.records.clear(user_id).await?;
        info!(%user_id, removed, "cleared reading history");
        Ok(removed)
    }
}
