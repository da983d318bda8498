use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::application::auth::AuthenticatedUser;
use crate::application::envelope::Envelope;
use crate::application::errors::ApiError;
use crate::application::routes::support::{JsonBody, PathParam};
use crate::application::state::AppState;
use crate::domain::bookmarks::{ShelfEntry, Toggled};
use crate::domain::ids::{BookId, BookmarkId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBookmark {
    pub book_id: BookId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookmarkCreated {
    pub id: BookmarkId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookmarkStatus {
    pub is_bookmarked: bool,
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn list_bookmarks(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Envelope<Vec<ShelfEntry>>, ApiError> {
    let shelf = state.bookmark_service.shelf(auth_user.id).await?;
    Ok(Envelope::ok(shelf))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn add_bookmark(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    JsonBody(payload): JsonBody<AddBookmark>,
) -> Result<Envelope<BookmarkCreated>, ApiError> {
    let bookmark = state
        .bookmark_service
        .add(auth_user.id, payload.book_id)
        .await?;
    Ok(Envelope::with_message(
        "加入书架成功",
        BookmarkCreated { id: bookmark.id },
    ))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn remove_bookmark(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    PathParam(book_id): PathParam<BookId>,
) -> Result<Envelope<Option<()>>, ApiError> {
    state.bookmark_service.remove(auth_user.id, book_id).await?;
    Ok(Envelope::with_message("移出书架成功", None))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn check_bookmark(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    PathParam(book_id): PathParam<BookId>,
) -> Result<Envelope<BookmarkStatus>, ApiError> {
    let is_bookmarked = state
        .bookmark_service
        .is_bookmarked(auth_user.id, book_id)
        .await?;
    Ok(Envelope::ok(BookmarkStatus { is_bookmarked }))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn toggle_bookmark(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    PathParam(book_id): PathParam<BookId>,
) -> Result<Envelope<BookmarkStatus>, ApiError> {
    let toggled = state
        .bookmark_service
        .toggle(auth_user.id, book_id)
        .await?;
    let message = match toggled {
        Toggled::Added(_) => "已加入书架",
        Toggled::Removed => "已移出书架",
    };
    Ok(Envelope::with_message(
        message,
        BookmarkStatus {
            is_bookmarked: toggled.is_bookmarked(),
        },
    ))
}
