mod accounts;
pub(crate) mod bookmarks;
mod reading_records;

pub use accounts::AccountService;
pub use bookmarks::BookmarkService;
pub use reading_records::ReadingRecordService;
