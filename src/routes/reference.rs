use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_valid::Valid;

use crate::{
    catalog::models::ReferenceCategory,
    dto::reference::{ReferencePageResponse, ReferenceQuery},
    error::AppError,
    services::reference_service,
    state::SharedState,
};

/// Routes serving cached reference collections.
pub fn router() -> Router<SharedState> {
    Router::new().route("/reference/{category}", get(reference_collection))
}

/// Page of genres, platforms or developers.
#[utoipa::path(
    get,
    path = "/reference/{category}",
    tag = "reference",
    params(
        ("category" = ReferenceCategory, Path, description = "genres, platforms or developers"),
        ReferenceQuery
    ),
    responses(
        (status = 200, description = "Reference page", body = ReferencePageResponse),
        (status = 503, description = "Catalog temporarily unavailable")
    )
)]
pub async fn reference_collection(
    State(state): State<SharedState>,
    Path(category): Path<ReferenceCategory>,
    Valid(Query(query)): Valid<Query<ReferenceQuery>>,
) -> Result<Json<ReferencePageResponse>, AppError> {
    let page =
        reference_service::reference_collection(&state, category, query.page, query.page_size)
            .await?;
    Ok(Json(page.as_ref().into()))
}
