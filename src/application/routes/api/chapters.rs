use axum::extract::State;

use crate::application::envelope::{Envelope, Paginated};
use crate::application::errors::{ApiError, AppError};
use crate::application::routes::api::books::BOOK_NOT_FOUND_MESSAGE;
use crate::application::routes::support::{PageQuery, PathParam, QueryParams};
use crate::application::state::AppState;
use crate::domain::RepositoryError;
use crate::domain::chapters::{ChapterDetail, ChapterListItem, DEFAULT_CHAPTER_PAGE_SIZE};
use crate::domain::ids::{BookId, ChapterId};

pub const CHAPTER_NOT_FOUND_MESSAGE: &str = "Chapter not found";

#[tracing::instrument(skip(state))]
pub(crate) async fn list_chapters(
    State(state): State<AppState>,
    PathParam(book_id): PathParam<BookId>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Paginated<ChapterListItem>, ApiError> {
    if !state.book_repo.exists(book_id).await? {
        return Err(AppError::not_found(BOOK_NOT_FOUND_MESSAGE).into());
    }
    let request = query.into_request(DEFAULT_CHAPTER_PAGE_SIZE);
    let page = state.chapter_repo.list_by_book(book_id, request).await?;
    Ok(Paginated::from(page))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_chapter(
    State(state): State<AppState>,
    PathParam(id): PathParam<ChapterId>,
) -> Result<Envelope<ChapterDetail>, ApiError> {
    let detail = state
        .chapter_repo
        .get_detail(id)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound => AppError::not_found(CHAPTER_NOT_FOUND_MESSAGE),
            other => AppError::from(other),
        })?;
    Ok(Envelope::ok(detail))
}
