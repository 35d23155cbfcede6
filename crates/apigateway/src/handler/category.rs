use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use shared::{
    abstract_trait::DynCategoryQueryService,
    errors::{ErrorResponse, HttpError},
    model::CategoryAggregate,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/categories/{category}",
    tag = "Category",
    params(("category" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Availability summary of the category", body = CategoryAggregate),
        (status = 404, description = "No products in this category", body = ErrorResponse)
    )
)]
pub async fn get_category(
    Extension(service): Extension<DynCategoryQueryService>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_category(&category).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn category_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/categories/{category}", get(get_category))
        .layer(Extension(app_state.di_container.category_query.clone()))
}
