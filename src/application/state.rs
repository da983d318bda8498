use std::sync::Arc;

use crate::application::services::{AccountService, BookmarkService, ReadingRecordService};
use crate::domain::repositories::{
    BookRepository, BookmarkRepository, CategoryRepository, ChapterRepository,
    ReadingRecordRepository, UserRepository,
};
use crate::infrastructure::auth::JwtKeys;
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::bookmarks::SqlBookmarkRepository;
use crate::infrastructure::repositories::books::SqlBookRepository;
use crate::infrastructure::repositories::categories::SqlCategoryRepository;
use crate::infrastructure::repositories::chapters::SqlChapterRepository;
use crate::infrastructure::repositories::reading_records::SqlReadingRecordRepository;
use crate::infrastructure::repositories::users::SqlUserRepository;

/// Default number of login/register/refresh calls allowed per IP per minute.
pub const DEFAULT_AUTH_RATE_LIMIT_PER_MINUTE: u32 = 10;

/// Everything that varies between production and test environments. Repos
/// and services are created from the database pool.
pub struct AppStateConfig {
    pub jwt_keys: JwtKeys,
    pub auth_rate_limit_per_minute: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub category_repo: Arc<dyn CategoryRepository>,
    pub book_repo: Arc<dyn BookRepository>,
    pub chapter_repo: Arc<dyn ChapterRepository>,
    pub jwt_keys: Arc<JwtKeys>,
    pub account_service: AccountService,
    pub bookmark_service: BookmarkService,
    pub reading_record_service: ReadingRecordService,
    pub auth_rate_limit_per_minute: u32,
}

impl AppState {
    /// Build the full application state from a database connection and config.
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let pool = database.clone_pool();

        let user_repo: Arc<dyn UserRepository> = Arc::new(SqlUserRepository::new(pool.clone()));
        let category_repo: Arc<dyn CategoryRepository> =
            Arc::new(SqlCategoryRepository::new(pool.clone()));
        let book_repo: Arc<dyn BookRepository> = Arc::new(SqlBookRepository::new(pool.clone()));
        let chapter_repo: Arc<dyn ChapterRepository> =
            Arc::new(SqlChapterRepository::new(pool.clone()));
        let bookmark_repo: Arc<dyn BookmarkRepository> =
            Arc::new(SqlBookmarkRepository::new(pool.clone()));
        let reading_record_repo: Arc<dyn ReadingRecordRepository> =
            Arc::new(SqlReadingRecordRepository::new(pool));

        let jwt_keys = Arc::new(config.jwt_keys);

        let account_service = AccountService::new(user_repo, Arc::clone(&jwt_keys));
        let bookmark_service = BookmarkService::new(bookmark_repo, Arc::clone(&book_repo));
        let reading_record_service = ReadingRecordService::new(
            reading_record_repo,
            Arc::clone(&book_repo),
            Arc::clone(&chapter_repo),
        );

        Self {
            category_repo,
            book_repo,
            chapter_repo,
            jwt_keys,
            account_service,
            bookmark_service,
            reading_record_service,
            auth_rate_limit_per_minute: config.auth_rate_limit_per_minute,
        }
    }
}
