pub mod auth;
pub mod bookmarks;
pub mod books;
pub mod categories;
pub mod chapters;
pub mod reading_records;
pub mod users;

use axum::routing::{delete, get, post};

use crate::application::rate_limit::RateLimitLayer;
use crate::application::state::AppState;

pub(super) fn router(auth_rate_limit_per_minute: u32) -> axum::Router<AppState> {
    catalog_routes()
        .merge(reader_routes())
        .merge(auth_routes().layer(RateLimitLayer::per_minute(auth_rate_limit_per_minute)))
        .route("/users/profile", get(users::profile))
        .route("/users/{id}", get(users::get_user))
}

fn auth_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/users/register", post(users::register))
}

fn catalog_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/books", get(books::list_books))
        .route("/books/search", get(books::search_books))
        .route("/books/{id}", get(books::get_book))
        .route("/books/{id}/chapters", get(chapters::list_chapters))
        .route("/chapters/{id}", get(chapters::get_chapter))
        .route("/categories", get(categories::list_categories))
}

fn reader_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/bookmarks",
            get(bookmarks::list_bookmarks).post(bookmarks::add_bookmark),
        )
        .route("/bookmarks/{book_id}", delete(bookmarks::remove_bookmark))
        .route("/bookmarks/check/{book_id}", get(bookmarks::check_bookmark))
        .route("/bookmarks/toggle/{book_id}", post(bookmarks::toggle_bookmark))
        .route(
            "/reading-records",
            get(reading_records::list_history).post(reading_records::save_progress),
        )
        .route("/reading-records/batch", post(reading_records::batch_progress))
        .route(
            "/reading-records/book/{book_id}",
            get(reading_records::get_book_progress).delete(reading_records::delete_book_progress),
        )
        .route("/reading-records/clear", delete(reading_records::clear_history))
}
