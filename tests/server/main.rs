mod auth_api;
mod books_api;
mod chapters_api;
mod helpers;
mod reading_records_api;
mod users_api;
