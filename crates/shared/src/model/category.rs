use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Sort key reserved for the per-category aggregate record.
pub const AGGREGATE_ID: &str = "CATEGORY";

/// Derived summary of a category, recomputed wholesale from its products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    pub category: String,
    pub id: String,
    pub total_availability: Decimal,
    #[serde(rename = "productIDs")]
    pub product_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryAggregate {
    pub fn new(
        category: impl Into<String>,
        total_availability: Decimal,
        product_ids: Vec<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            category: category.into(),
            id: AGGREGATE_ID.to_string(),
            total_availability,
            product_ids,
            created_at: now,
            updated_at: now,
        }
    }
}
