use crate::model::{Order, Product};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductUpdateResponse {
    pub message: String,
    #[serde(rename = "changedFields", skip_serializing_if = "Option::is_none")]
    pub changed_fields: Option<Vec<String>>,
    pub product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderUpdateResponse {
    pub message: String,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDeleteResponse {
    pub message: String,
    #[serde(rename = "deletedOrder")]
    pub deleted_order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}
