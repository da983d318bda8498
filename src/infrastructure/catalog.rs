//! Bulk catalog loading from a JSON document.
//!
//! The document lists categories and books, each book carrying its tags and
//! chapters. Books are inserted through the regular repositories, so an
//! import behaves exactly like books created any other way. Each book lands
//! together with its chapters or not at all; re-running an import adds the
//! books again.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::RepositoryError;
use crate::domain::books::NewBook;
use crate::domain::categories::NewCategory;
use crate::domain::chapters::NewChapter;
use crate::domain::repositories::{BookRepository, CategoryRepository};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<NewCategory>,
    #[serde(default)]
    pub books: Vec<CatalogBook>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogBook {
    #[serde(flatten)]
    pub book: NewBook,
    #[serde(default)]
    pub chapters: Vec<NewChapter>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories: usize,
    pub books: usize,
    pub chapters: usize,
}

impl Catalog {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse catalog {}", path.display()))
    }
}

pub struct CatalogImporter {
    categories: Arc<dyn CategoryRepository>,
    books: Arc<dyn BookRepository>,
}

impl CatalogImporter {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        books: Arc<dyn BookRepository>,
    ) -> Self {
        Self { categories, books }
    }

    /// Insert every category and book in the catalog. Categories that
    /// already exist are skipped; books are always added as new rows.
    pub async fn import(&self, catalog: Catalog) -> anyhow::Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for category in catalog.categories {
            let name = category.name.clone();
            match self.categories.insert(category).await {
                Ok(_) => summary.categories += 1,
                Err(RepositoryError::Conflict(_)) => {
                    info!(category = %name, "category already present, skipping");
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to import category {name}"));
                }
            }
        }

        for entry in catalog.books {
            let CatalogBook { mut book, chapters } = entry;
            if book.title.trim().is_empty() {
                warn!("skipping catalog book with an empty title");
                continue;
            }
            if book.word_count.is_none() {
                book.word_count = Some(chapters.iter().map(NewChapter::effective_word_count).sum());
            }

            let title = book.title.clone();
            let chapter_count = chapters.len();
            let created = self
                .books
                .insert_with_chapters(book, chapters)
                .await
                .with_context(|| format!("failed to import book {title}"))?;
            summary.chapters += chapter_count;

            info!(book_id = %created.id, title = %title, "imported book");
            summary.books += 1;
        }

        Ok(summary)
    }
}
