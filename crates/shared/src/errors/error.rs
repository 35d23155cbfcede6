use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` output into `{field, message}` pairs, sorted by field.
/// Struct-level (schema) errors are reported against `body`.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        let field = if field == "__all__" {
            "body".to_string()
        } else {
            field.to_string()
        };

        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| match error.code.as_ref() {
                    "length" => "Invalid length".to_string(),
                    "range" => "Value out of range".to_string(),
                    "custom" => "Custom validation failed".to_string(),
                    _ => format!("Invalid {field}"),
                });
            out.push(FieldError::new(field.clone(), message));
        }
    }

    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}
