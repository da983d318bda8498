pub mod bookmarks;
pub mod books;
pub mod categories;
pub mod chapters;
pub mod reading_records;
pub mod users;
