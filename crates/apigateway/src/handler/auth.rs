use crate::state::AppState;
use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use shared::{
    abstract_trait::DynJwtService,
    domain::responses::TokenResponse,
    errors::{ErrorResponse, HttpError},
};
use std::sync::Arc;
use tracing::info;

#[utoipa::path(
    get,
    path = "/auth/token",
    tag = "Auth",
    responses(
        (status = 200, description = "Demo bearer token, valid for one hour", body = TokenResponse),
        (status = 500, description = "Token could not be signed", body = ErrorResponse)
    )
)]
pub async fn issue_token(
    Extension(jwt): Extension<DynJwtService>,
) -> Result<impl IntoResponse, HttpError> {
    let token = jwt.generate_token()?;
    info!("🔑 Issued demo token");
    Ok((StatusCode::OK, Json(TokenResponse { token })))
}

pub fn auth_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/token", get(issue_token))
        .layer(Extension(app_state.jwt_config.clone()))
}
