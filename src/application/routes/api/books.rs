use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::application::envelope::{Envelope, Paginated};
use crate::application::errors::{ApiError, AppError};
use crate::application::routes::support::{
    PathParam, QueryParams, empty_string_as_none,
};
use crate::application::state::AppState;
use crate::domain::RepositoryError;
use crate::domain::books::{BookDetail, BookFilter, BookSummary, MAX_SEARCH_RESULTS};
use crate::domain::ids::BookId;
use crate::domain::listing::{DEFAULT_PAGE_SIZE, PageRequest};

pub const BOOK_NOT_FOUND_MESSAGE: &str = "Book not found";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BookListQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: Option<String>,
}

#[tracing::instrument(skip(state))]
pub(crate) async fn list_books(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<BookListQuery>,
) -> Result<Paginated<BookSummary>, ApiError> {
    let request = PageRequest::from_query(query.page, query.limit, DEFAULT_PAGE_SIZE);
    let filter = BookFilter::by_category(query.category.as_deref());
    let page = state.book_repo.list(&filter, request).await?;
    Ok(Paginated::from(page))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn search_books(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Envelope<Vec<BookSummary>>, ApiError> {
    let keyword = query.keyword.unwrap_or_default();
    let books = state
        .book_repo
        .search(&keyword, MAX_SEARCH_RESULTS)
        .await?;
    Ok(Envelope::ok(books))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_book(
    State(state): State<AppState>,
    PathParam(id): PathParam<BookId>,
) -> Result<Envelope<BookDetail>, ApiError> {
    let detail = state.book_repo.get_detail(id).await.map_err(|err| match err {
        RepositoryError::NotFound => AppError::not_found(BOOK_NOT_FOUND_MESSAGE),
        other => AppError::from(other),
    })?;
    Ok(Envelope::ok(detail))
}
