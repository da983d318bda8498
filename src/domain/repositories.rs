use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::bookmarks::{Bookmark, ShelfEntry};
use crate::domain::books::{BookDetail, BookFilter, BookSummary, NewBook};
use crate::domain::categories::{Category, NewCategory};
use crate::domain::chapters::{Chapter, ChapterDetail, ChapterListItem, NewChapter};
use crate::domain::ids::{BookId, ChapterId, UserId};
use crate::domain::listing::{Page, PageRequest};
use crate::domain::reading_records::{
    BookProgress, ReadingHistoryEntry, SavedRecord, UpsertReadingRecord,
};
use crate::domain::users::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn get(&self, id: UserId) -> Result<User, RepositoryError>;
    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, category: NewCategory) -> Result<Category, RepositoryError>;
    async fn get_by_name(&self, name: &str) -> Result<Category, RepositoryError>;
    /// All categories in display order.
    async fn list_all(&self) -> Result<Vec<Category>, RepositoryError>;
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a book, creating its category and tags by name when missing.
    async fn insert(&self, book: NewBook) -> Result<BookSummary, RepositoryError>;
    /// Insert a book together with its chapters. Either all rows land or none do.
    async fn insert_with_chapters(
        &self,
        book: NewBook,
        chapters: Vec<NewChapter>,
    ) -> Result<BookSummary, RepositoryError>;
    async fn get(&self, id: BookId) -> Result<BookSummary, RepositoryError>;
    async fn get_detail(&self, id: BookId) -> Result<BookDetail, RepositoryError>;
    async fn exists(&self, id: BookId) -> Result<bool, RepositoryError>;
    async fn list(
        &self,
        filter: &BookFilter,
        request: PageRequest,
    ) -> Result<Page<BookSummary>, RepositoryError>;
    async fn search(&self, keyword: &str, limit: u32) -> Result<Vec<BookSummary>, RepositoryError>;
}

#[async_trait]
pub trait ChapterRepository: Send + Sync {
    async fn insert(&self, book_id: BookId, chapter: NewChapter)
    -> Result<Chapter, RepositoryError>;
    async fn get(&self, id: ChapterId) -> Result<Chapter, RepositoryError>;
    /// Chapter body plus its book and the neighbouring chapters.
    async fn get_detail(&self, id: ChapterId) -> Result<ChapterDetail, RepositoryError>;
    async fn list_by_book(
        &self,
        book_id: BookId,
        request: PageRequest,
    ) -> Result<Page<ChapterListItem>, RepositoryError>;
}

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<ShelfEntry>, RepositoryError>;
    async fn find(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<Bookmark>, RepositoryError>;
    /// Insert the bookmark and bump the book's `collect_count` atomically.
    /// Returns `Conflict` when the pair already exists.
    async fn add(&self, user_id: UserId, book_id: BookId) -> Result<Bookmark, RepositoryError>;
    /// Delete the bookmark and decrement `collect_count` atomically.
    /// Returns `NotFound` when the pair does not exist.
    async fn remove(&self, user_id: UserId, book_id: BookId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ReadingRecordRepository: Send + Sync {
    async fn list_by_user(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> Result<Page<ReadingHistoryEntry>, RepositoryError>;
    async fn get_for_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<BookProgress>, RepositoryError>;
    async fn list_for_books(
        &self,
        user_id: UserId,
        book_ids: &[BookId],
    ) -> Result<Vec<BookProgress>, RepositoryError>;
    /// Insert or update the (user, book) record. A newly created record
    /// also increments the book's `read_count`.
    async fn upsert(
        &self,
        user_id: UserId,
        record: UpsertReadingRecord,
    ) -> Result<SavedRecord, RepositoryError>;
    async fn delete_for_book(&self, user_id: UserId, book_id: BookId)
    -> Result<(), RepositoryError>;
    async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError>;
}
