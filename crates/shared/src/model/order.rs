use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// An order for a single product. `category`, `product_id`, `product_name`
/// and `unit_price` are snapshots taken at creation; only `quantity`, `total`
/// and `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub category: String,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
