mod auth;
mod category;
mod order;
mod product;

use crate::{middleware::jwt::auth_middleware, state::AppState};
use anyhow::Result;
use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header::CONTENT_TYPE},
    middleware,
    response::IntoResponse,
    routing::get,
};
use prometheus_client::encoding::text::encode;
use shared::errors::{FieldError, HttpError};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use uuid::Uuid;

pub use self::auth::auth_routes;
pub use self::category::category_routes;
pub use self::order::order_routes;
pub use self::product::product_routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::issue_token,

        product::get_products,
        product::get_product,
        product::create_product,
        product::update_product,
        product::delete_product,

        category::get_category,

        order::get_orders,
        order::get_order,
        order::create_order,
        order::update_order,
        order::delete_order,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Demo token endpoint"),
        (name = "Product", description = "Product endpoints"),
        (name = "Category", description = "Category availability endpoints"),
        (name = "Order", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Path ids are validated before this runs; a failure here still maps to
/// the validation envelope.
pub(crate) fn parse_id(id: &str) -> Result<Uuid, HttpError> {
    Uuid::parse_str(id)
        .map_err(|_| HttpError::Validation(vec![FieldError::new("id", "Invalid UUID format")]))
}

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut buffer = String::new();

    let registry = state.registry.lock().await;

    if let Err(e) = encode(&mut buffer, &registry) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}"),
        );
    }

    (
        StatusCode::OK,
        [(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        buffer,
    )
}

pub async fn openapi_handler() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

pub struct AppRouter;

impl AppRouter {
    pub fn build(app_state: AppState) -> Router {
        let shared_state = Arc::new(app_state);

        let api_router = Router::new()
            .merge(auth_routes(shared_state.clone()))
            .merge(product_routes(shared_state.clone()))
            .merge(category_routes(shared_state.clone()))
            .merge(order_routes(shared_state.clone()))
            .route_layer(middleware::from_fn(auth_middleware))
            .layer(Extension(shared_state.jwt_config.clone()));

        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/api-docs/openapi.json", get(openapi_handler))
            .with_state(shared_state)
            .merge(api_router)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(1024 * 1024))
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
    }

    pub async fn serve(
        port: u16,
        app_state: AppState,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let app = Self::build(app_state);

        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr).await?;

        info!("🚀 Server running on http://{}", listener.local_addr()?);
        info!("📚 OpenAPI document: http://localhost:{port}/api-docs/openapi.json");
        info!("📊 Metrics: http://localhost:{port}/metrics");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
