use axum::extract::State;

use crate::application::envelope::Envelope;
use crate::application::errors::ApiError;
use crate::application::state::AppState;
use crate::domain::books::ALL_CATEGORIES;

/// Category names in display order, led by the "all" pseudo-category.
#[tracing::instrument(skip(state))]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
) -> Result<Envelope<Vec<String>>, ApiError> {
    let categories = state.category_repo.list_all().await?;
    let names = std::iter::once(ALL_CATEGORIES.to_string())
        .chain(categories.into_iter().map(|c| c.name))
        .collect();
    Ok(Envelope::ok(names))
}
