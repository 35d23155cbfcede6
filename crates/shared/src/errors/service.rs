use crate::errors::{error::FieldError, error::field_errors, repository::RepositoryError};
use jsonwebtoken::errors::Error as JwtError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepositoryError),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Event bus error: {0}")]
    EventBus(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(field_errors(&errors))
    }
}

#[cfg(feature = "kafka")]
impl From<rdkafka::error::KafkaError> for ServiceError {
    fn from(error: rdkafka::error::KafkaError) -> Self {
        ServiceError::EventBus(error.to_string())
    }
}
