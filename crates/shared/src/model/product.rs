use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// A catalogue entry. `available` is never negative; after creation it is
/// only moved by product updates and the stock reconciler's conditional write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub category: String,
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub available: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn key(&self) -> ProductKey {
        ProductKey::new(self.category.clone(), self.id)
    }
}

/// Compound key `(category, id)`; `category` is the partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductKey {
    pub category: String,
    pub id: Uuid,
}

impl ProductKey {
    pub fn new(category: impl Into<String>, id: Uuid) -> Self {
        Self {
            category: category.into(),
            id,
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.id)
    }
}

/// Fields a product update may set. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub available: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl ProductPatch {
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(available) = self.available {
            product.available = available;
        }
        product.updated_at = self.updated_at;
    }
}
