use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{BookId, UserId};

/// Category name that means "no category filter".
pub const ALL_CATEGORIES: &str = "全部";

/// Search results are capped so a one-letter keyword cannot dump the catalog.
pub const MAX_SEARCH_RESULTS: u32 = 50;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Default)]
pub enum BookStatus {
    #[default]
    #[serde(rename = "连载中")]
    Ongoing,
    #[serde(rename = "已完结")]
    Completed,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Ongoing => "连载中",
            BookStatus::Completed => "已完结",
        }
    }
}

impl FromStr for BookStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "连载中" | "ongoing" => Ok(BookStatus::Ongoing),
            "已完结" | "completed" => Ok(BookStatus::Completed),
            _ => Err(()),
        }
    }
}

/// Catalog card shown in listings, search results and the book page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub cover: Option<String>,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub word_count: i64,
    pub chapter_count: i64,
    pub status: BookStatus,
    pub rating: f64,
    pub read_count: i64,
    pub like_count: i64,
    pub collect_count: i64,
    pub comment_count: i64,
    pub published_at: Option<DateTime<Utc>>,
}

/// The registered user who wrote the book, when there is one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorUser {
    pub id: UserId,
    pub nickname: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: BookSummary,
    pub author_user: Option<AuthorUser>,
}

#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub category: Option<String>,
}

impl BookFilter {
    /// `None`, blank and the "all" sentinel all mean no filter.
    pub fn by_category(category: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(String::from);
        Self { category }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub word_count: Option<i64>,
    #[serde(default)]
    pub status: BookStatus,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub author_user_id: Option<UserId>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewBook {
    pub fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.author = self.author.trim().to_string();
        self.category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        self.tags.dedup();
        self
    }
}
