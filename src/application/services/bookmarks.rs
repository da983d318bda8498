use std::sync::Arc;

use tracing::info;

use crate::application::auth::UNAUTHORIZED_MESSAGE;
use crate::application::errors::AppError;
use crate::domain::RepositoryError;
use crate::domain::bookmarks::{Bookmark, ShelfEntry, Toggled};
use crate::domain::ids::{BookId, UserId};
use crate::domain::repositories::{BookRepository, BookmarkRepository};

pub const BOOK_NOT_FOUND_MESSAGE: &str = "书籍不存在";
pub const ALREADY_SHELVED_MESSAGE: &str = "该书籍已在书架中";
pub const NOT_SHELVED_MESSAGE: &str = "该书籍不在书架中";

#[derive(Clone)]
pub struct BookmarkService {
    bookmarks: Arc<dyn BookmarkRepository>,
    books: Arc<dyn BookRepository>,
}

impl BookmarkService {
    pub fn new(bookmarks: Arc<dyn BookmarkRepository>, books: Arc<dyn BookRepository>) -> Self {
        Self { bookmarks, books }
    }

    pub async fn shelf(&self, user_id: UserId) -> Result<Vec<ShelfEntry>, AppError> {
        Ok(self.bookmarks.list_by_user(user_id).await?)
    }

    pub async fn add(&self, user_id: UserId, book_id: BookId) -> Result<Bookmark, AppError> {
        if !self.books.exists(book_id).await? {
            return Err(AppError::not_found(BOOK_NOT_FOUND_MESSAGE));
        }

        let bookmark = self
            .bookmarks
            .add(user_id, book_id)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict(_) => AppError::conflict(ALREADY_SHELVED_MESSAGE),
                // The book was checked above, so the missing row is the user.
                RepositoryError::NotFound => AppError::unauthorized(UNAUTHORIZED_MESSAGE),
                other => AppError::from(other),
            })?;

        info!(%user_id, %book_id, "book added to shelf");
        Ok(bookmark)
    }

    pub async fn remove(&self, user_id: UserId, book_id: BookId) -> Result<(), AppError> {
        self.bookmarks
            .remove(user_id, book_id)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => AppError::not_found(NOT_SHELVED_MESSAGE),
                other => AppError::from(other),
            })?;

        info!(%user_id, %book_id, "book removed from shelf");
        Ok(())
    }

    pub async fn is_bookmarked(&self, user_id: UserId, book_id: BookId) -> Result<bool, AppError> {
        Ok(self.bookmarks.find(user_id, book_id).await?.is_some())
    }

    /// Remove the book if it is shelved, otherwise add it.
    ///
    /// A concurrent request may flip the state between the lookup and the
    /// write; the unique index and the delete's row count decide the outcome.
    pub async fn toggle(&self, user_id: UserId, book_id: BookId) -> Result<Toggled, AppError> {
        if self.bookmarks.find(user_id, book_id).await?.is_some() {
            return match self.remove(user_id, book_id).await {
                Ok(()) | Err(AppError::NotFound(_)) => Ok(Toggled::Removed),
                Err(err) => Err(err),
            };
        }

        match self.add(user_id, book_id).await {
            Ok(bookmark) => Ok(Toggled::Added(bookmark.id)),
            Err(AppError::Conflict(_)) => {
                let existing = self
                    .bookmarks
                    .find(user_id, book_id)
                    .await?
                    .ok_or_else(|| AppError::unexpected("bookmark vanished during toggle"))?;
                Ok(Toggled::Added(existing.id))
            }
            Err(err) => Err(err),
        }
    }
}
