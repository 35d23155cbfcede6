use crate::model::ProductKey;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub const ORDER_SOURCE: &str = "order.service";
pub const ORDER_CREATED: &str = "order.created";
pub const ORDER_UPDATED: &str = "order.updated";
pub const ORDER_DELETED: &str = "order.deleted";

/// Bus envelope. `detail` stays untyped on the wire so consumers can skip
/// messages they cannot decode instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default = "Utc::now")]
    pub time: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(source: &str, detail_type: &str, detail: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.to_string(),
            detail_type: detail_type.to_string(),
            detail: Some(detail),
            time: Utc::now(),
        }
    }

    /// Value of `detail.orderId`, if any. Used as the partitioning key.
    pub fn order_id(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.get("orderId"))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedDetail {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub category: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdatedDetail {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub category: String,
    pub quantity: i64,
    pub old_quantity: i64,
    pub quantity_diff: i64,
    #[serde(default)]
    pub total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDeletedDetail {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub category: String,
    pub quantity: i64,
    #[serde(default)]
    pub total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    Created(OrderCreatedDetail),
    Updated(OrderUpdatedDetail),
    Deleted(OrderDeletedDetail),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventDecodeError {
    #[error("event has no detail")]
    MissingDetail,

    #[error("event detail is missing `{0}`")]
    MissingKey(&'static str),

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("malformed event detail: {0}")]
    MalformedDetail(String),
}

impl OrderEvent {
    pub fn detail_type(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => ORDER_CREATED,
            OrderEvent::Updated(_) => ORDER_UPDATED,
            OrderEvent::Deleted(_) => ORDER_DELETED,
        }
    }

    pub fn order_id(&self) -> Uuid {
        match self {
            OrderEvent::Created(d) => d.order_id,
            OrderEvent::Updated(d) => d.order_id,
            OrderEvent::Deleted(d) => d.order_id,
        }
    }

    pub fn product_key(&self) -> ProductKey {
        match self {
            OrderEvent::Created(d) => ProductKey::new(d.category.clone(), d.product_id),
            OrderEvent::Updated(d) => ProductKey::new(d.category.clone(), d.product_id),
            OrderEvent::Deleted(d) => ProductKey::new(d.category.clone(), d.product_id),
        }
    }

    /// Signed change to the product's `available`: creating an order takes
    /// stock, deleting gives it back, updating moves it by the quantity diff.
    /// `None` when the quantity read off the wire cannot be negated.
    pub fn stock_change(&self) -> Option<i64> {
        match self {
            OrderEvent::Created(d) => d.quantity.checked_neg(),
            OrderEvent::Updated(d) => d.quantity_diff.checked_neg(),
            OrderEvent::Deleted(d) => Some(d.quantity),
        }
    }

    pub fn to_envelope(&self) -> Result<DomainEvent, serde_json::Error> {
        let detail = match self {
            OrderEvent::Created(d) => serde_json::to_value(d)?,
            OrderEvent::Updated(d) => serde_json::to_value(d)?,
            OrderEvent::Deleted(d) => serde_json::to_value(d)?,
        };

        Ok(DomainEvent::new(ORDER_SOURCE, self.detail_type(), detail))
    }
}

impl TryFrom<&DomainEvent> for OrderEvent {
    type Error = EventDecodeError;

    fn try_from(event: &DomainEvent) -> Result<Self, Self::Error> {
        let detail = event
            .detail
            .as_ref()
            .filter(|d| !d.is_null())
            .ok_or(EventDecodeError::MissingDetail)?;

        for key in ["category", "productId"] {
            match detail.get(key) {
                None | Some(Value::Null) => return Err(EventDecodeError::MissingKey(key)),
                Some(Value::String(s)) if s.is_empty() => {
                    return Err(EventDecodeError::MissingKey(key));
                }
                Some(_) => {}
            }
        }

        let malformed = |e: serde_json::Error| EventDecodeError::MalformedDetail(e.to_string());

        match event.detail_type.as_str() {
            ORDER_CREATED => serde_json::from_value(detail.clone())
                .map(OrderEvent::Created)
                .map_err(malformed),
            ORDER_UPDATED => serde_json::from_value(detail.clone())
                .map(OrderEvent::Updated)
                .map_err(malformed),
            ORDER_DELETED => serde_json::from_value(detail.clone())
                .map(OrderEvent::Deleted)
                .map_err(malformed),
            other => Err(EventDecodeError::UnknownEventType(other.to_string())),
        }
    }
}
