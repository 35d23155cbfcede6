use crate::{
    handler::parse_id,
    middleware::validate::{ValidatedJson, ValidatedPath},
    state::AppState,
};
use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use shared::{
    abstract_trait::{DynOrderCommandService, DynOrderQueryService},
    domain::{
        requests::{CreateOrderRequest, OrderKeyPath, UpdateOrderRequest},
        responses::{OrderDeleteResponse, OrderUpdateResponse},
    },
    errors::{ErrorResponse, HttpError, ValidationErrorResponse},
    model::Order,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/orders",
    tag = "Order",
    responses(
        (status = 200, description = "All orders, newest first", body = Vec<Order>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_orders(
    Extension(service): Extension<DynOrderQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Order",
    params(OrderKeyPath),
    responses(
        (status = 200, description = "Order details", body = Order),
        (status = 400, description = "Invalid order id", body = ValidationErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn get_order(
    Extension(service): Extension<DynOrderQueryService>,
    ValidatedPath(path): ValidatedPath<OrderKeyPath>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(parse_id(&path.id)?).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Validation error or not enough stock", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Order written but its event was not published", body = ErrorResponse)
    )
)]
pub async fn create_order(
    Extension(service): Extension<DynOrderCommandService>,
    ValidatedJson(body): ValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create_order(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/orders/{id}",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(OrderKeyPath),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Quantity updated, or unchanged", body = OrderUpdateResponse),
        (status = 400, description = "Validation error or not enough stock", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Order or product not found", body = ErrorResponse)
    )
)]
pub async fn update_order(
    Extension(service): Extension<DynOrderCommandService>,
    ValidatedPath(path): ValidatedPath<OrderKeyPath>,
    ValidatedJson(body): ValidatedJson<UpdateOrderRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update_order(parse_id(&path.id)?, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(OrderKeyPath),
    responses(
        (status = 200, description = "Order deleted", body = OrderDeleteResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn delete_order(
    Extension(service): Extension<DynOrderCommandService>,
    ValidatedPath(path): ValidatedPath<OrderKeyPath>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.delete_order(parse_id(&path.id)?).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn order_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/orders", get(get_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .layer(Extension(app_state.di_container.order_query.clone()))
        .layer(Extension(app_state.di_container.order_command.clone()))
}
