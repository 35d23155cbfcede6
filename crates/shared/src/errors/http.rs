use crate::errors::{
    error::{ErrorResponse, FieldError, ValidationErrorResponse},
    repository::RepositoryError,
    service::ServiceError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Validation(Vec<FieldError>),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => HttpError::Validation(errors),

            ServiceError::NotFound(msg) => HttpError::NotFound(msg),

            ServiceError::InsufficientStock(msg) => HttpError::BadRequest(msg),

            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => HttpError::NotFound("Not found".into()),
                other => {
                    error!("Repository failure: {other}");
                    HttpError::Internal("Internal Server Error".into())
                }
            },

            ServiceError::Jwt(err) => HttpError::Unauthorized(format!("JWT error: {err}")),

            ServiceError::EventBus(msg) | ServiceError::Internal(msg) => {
                error!("Internal failure: {msg}");
                HttpError::Internal(msg)
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            HttpError::Validation(errors) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ValidationErrorResponse { errors }),
                )
                    .into_response();
            }
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: msg })).into_response()
    }
}

impl From<validator::ValidationErrors> for HttpError {
    fn from(errors: validator::ValidationErrors) -> Self {
        HttpError::Validation(crate::errors::error::field_errors(&errors))
    }
}
