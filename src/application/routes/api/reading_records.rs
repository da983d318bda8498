use std::collections::BTreeMap;

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::application::auth::AuthenticatedUser;
use crate::application::envelope::{Envelope, HistoryPage};
use crate::application::errors::ApiError;
use crate::application::routes::support::{
    JsonBody, PathParam, QueryParams, empty_string_as_none,
};
use crate::application::state::AppState;
use crate::domain::ids::BookId;
use crate::domain::listing::PageRequest;
use crate::domain::reading_records::{
    BookProgress, DEFAULT_HISTORY_PAGE_SIZE, ReadingHistoryEntry, ReadingRecord,
    UpsertReadingRecord,
};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HistoryQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchProgressRequest {
    #[serde(default)]
    pub book_ids: Vec<BookId>,
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn list_history(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    QueryParams(query): QueryParams<HistoryQuery>,
) -> Result<Envelope<HistoryPage<ReadingHistoryEntry>>, ApiError> {
    let request = PageRequest::from_query(query.page, query.page_size, DEFAULT_HISTORY_PAGE_SIZE);
    let page = state
        .reading_record_service
        .history(auth_user.id, request)
        .await?;
    Ok(Envelope::ok(HistoryPage::from(page)))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn get_book_progress(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    PathParam(book_id): PathParam<BookId>,
) -> Result<Envelope<Option<BookProgress>>, ApiError> {
    let progress = state
        .reading_record_service
        .for_book(auth_user.id, book_id)
        .await?;
    Ok(Envelope::ok(progress))
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn batch_progress(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    JsonBody(payload): JsonBody<BatchProgressRequest>,
) -> Result<Envelope<BTreeMap<BookId, BookProgress>>, ApiError> {
    let progress = state
        .reading_record_service
        .for_books(auth_user.id, &payload.book_ids)
        .await?;
    Ok(Envelope::ok(progress))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn save_progress(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    JsonBody(payload): JsonBody<UpsertReadingRecord>,
) -> Result<Envelope<ReadingRecord>, ApiError> {
    let record = state
        .reading_record_service
        .save(auth_user.id, payload)
        .await?;
    Ok(Envelope::ok(record))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn delete_book_progress(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    PathParam(book_id): PathParam<BookId>,
) -> Result<Envelope<Option<()>>, ApiError> {
    state
        .reading_record_service
        .delete_for_book(auth_user.id, book_id)
        .await?;
    Ok(Envelope::with_message("删除成功", None))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn clear_history(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Envelope<Option<()>>, ApiError> {
    state.reading_record_service.clear(auth_user.id).await?;
    Ok(Envelope::with_message("已清空阅读历史", None))
}
