use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::books::BookStatus;
use crate::domain::errors::ValidationError;
use crate::domain::ids::{BookId, ChapterId, ReadingRecordId, UserId};

pub const DEFAULT_HISTORY_PAGE_SIZE: u32 = 20;
pub const MAX_PROGRESS: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub id: ReadingRecordId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub chapter_id: ChapterId,
    pub progress: i64,
    pub last_read_at: DateTime<Utc>,
}

/// A reading-history row with the book and chapter it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingHistoryEntry {
    pub id: ReadingRecordId,
    pub book_id: BookId,
    pub book_title: String,
    pub author: String,
    pub cover: Option<String>,
    pub chapter_count: i64,
    pub book_status: BookStatus,
    pub chapter_id: ChapterId,
    pub chapter_title: String,
    pub chapter_order_num: i64,
    pub progress: i64,
    pub last_read_at: DateTime<Utc>,
}

/// Where a reader is inside one book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookProgress {
    pub id: ReadingRecordId,
    pub book_id: BookId,
    pub chapter_id: ChapterId,
    pub chapter_title: String,
    pub chapter_order_num: i64,
    pub progress: i64,
    pub last_read_at: DateTime<Utc>,
}

/// Result of an upsert: the stored record and whether it was new.
#[derive(Debug, Clone)]
pub struct SavedRecord {
    pub record: ReadingRecord,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertReadingRecord {
    pub book_id: BookId,
    pub chapter_id: ChapterId,
    pub progress: i64,
}

impl UpsertReadingRecord {
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.book_id.into_inner() <= 0 {
            return Err(ValidationError::new("book_id 必须为正整数"));
        }
        if self.chapter_id.into_inner() <= 0 {
            return Err(ValidationError::new("chapter_id 必须为正整数"));
        }
        if !(0..=MAX_PROGRESS).contains(&self.progress) {
            return Err(ValidationError::new("progress 必须在 0 到 100 之间"));
        }
        Ok(self)
    }
}
