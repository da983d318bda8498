pub mod bookmarks;
pub mod books;
pub mod categories;
pub mod chapters;
pub mod errors;
pub mod ids;
pub mod listing;
pub mod reading_records;
pub mod repositories;
pub mod tokens;
pub mod users;

// Re-exports
pub use errors::{RepositoryError, ValidationError};
