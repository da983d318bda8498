use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{BookId, ChapterId};

pub const DEFAULT_CHAPTER_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub book_id: BookId,
    pub title: String,
    pub content: String,
    pub order_num: i64,
    pub word_count: i64,
    pub is_vip: bool,
    pub created_at: DateTime<Utc>,
}

/// Table-of-contents row; omits the chapter body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterListItem {
    pub id: ChapterId,
    pub title: String,
    pub order_num: i64,
    pub word_count: i64,
    pub is_vip: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterRef {
    pub id: ChapterId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRef {
    pub id: BookId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDetail {
    pub id: ChapterId,
    pub title: String,
    pub content: String,
    pub order_num: i64,
    pub word_count: i64,
    pub is_vip: bool,
    pub book: BookRef,
    pub prev_chapter: Option<ChapterRef>,
    pub next_chapter: Option<ChapterRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChapter {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub order_num: i64,
    #[serde(default)]
    pub word_count: Option<i64>,
    #[serde(default)]
    pub is_vip: bool,
}

impl NewChapter {
    /// Explicit word count, or the number of non-whitespace characters in
    /// the body (CJK text has no word separators).
    pub fn effective_word_count(&self) -> i64 {
        self.word_count.unwrap_or_else(|| {
            self.content
                .chars()
                .filter(|c| !c.is_whitespace())
                .count() as i64
        })
    }
}
