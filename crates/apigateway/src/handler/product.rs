use crate::{
    handler::parse_id,
    middleware::validate::{ValidatedJson, ValidatedPath, ValidatedQuery},
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
    abstract_trait::{DynProductCommandService, DynProductQueryService},
    domain::{
        requests::{CreateProductRequest, FindAllProducts, ProductKeyPath, UpdateProductRequest},
        responses::{MessageResponse, ProductUpdateResponse},
    },
    errors::{ErrorResponse, HttpError, ValidationErrorResponse},
    model::Product,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/products",
    tag = "Product",
    params(FindAllProducts),
    responses(
        (status = 200, description = "Products matching the filters", body = Vec<Product>),
        (status = 400, description = "Invalid filters", body = ValidationErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_products(
    Extension(service): Extension<DynProductQueryService>,
    ValidatedQuery(params): ValidatedQuery<FindAllProducts>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/products/{category}/{id}",
    tag = "Product",
    params(ProductKeyPath),
    responses(
        (status = 200, description = "Product details", body = Product),
        (status = 400, description = "Invalid key", body = ValidationErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn get_product(
    Extension(service): Extension<DynProductQueryService>,
    ValidatedPath(path): ValidatedPath<ProductKeyPath>,
) -> Result<impl IntoResponse, HttpError> {
    let id = parse_id(&path.id)?;
    let response = service.find_by_key(&path.category, id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "Product",
    security(("bearer_auth" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation error", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_product(
    Extension(service): Extension<DynProductCommandService>,
    ValidatedJson(body): ValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create_product(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/products/{category}/{id}",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(ProductKeyPath),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated, or unchanged", body = ProductUpdateResponse),
        (status = 400, description = "Validation error", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn update_product(
    Extension(service): Extension<DynProductCommandService>,
    ValidatedPath(path): ValidatedPath<ProductKeyPath>,
    ValidatedJson(body): ValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let id = parse_id(&path.id)?;
    let response = service.update_product(&path.category, id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/products/{category}/{id}",
    tag = "Product",
    security(("bearer_auth" = [])),
    params(ProductKeyPath),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn delete_product(
    Extension(service): Extension<DynProductCommandService>,
    ValidatedPath(path): ValidatedPath<ProductKeyPath>,
) -> Result<impl IntoResponse, HttpError> {
    let id = parse_id(&path.id)?;
    let response = service.delete_product(&path.category, id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn product_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/products", get(get_products).post(create_product))
        .route(
            "/products/{category}/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .layer(Extension(app_state.di_container.product_query.clone()))
        .layer(Extension(app_state.di_container.product_command.clone()))
}
