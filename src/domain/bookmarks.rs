use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::books::BookStatus;
use crate::domain::ids::{BookId, BookmarkId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub created_at: DateTime<Utc>,
}

/// A bookmark joined with the book it points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelfEntry {
    pub id: BookmarkId,
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub cover: Option<String>,
    pub category: String,
    pub word_count: i64,
    pub chapter_count: i64,
    pub status: BookStatus,
    pub added_at: DateTime<Utc>,
}

/// Outcome of flipping a book's shelf membership.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Toggled {
    Added(BookmarkId),
    Removed,
}

impl Toggled {
    pub fn is_bookmarked(self) -> bool {
        matches!(self, Toggled::Added(_))
    }
}
