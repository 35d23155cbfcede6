use prometheus_client::metrics::{counter::Counter, family::Family};
use prometheus_client::registry::Registry;
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};
use rust_decimal::Decimal;
use shared::{
    abstract_trait::DynProductCommandRepository,
    domain::event::{DomainEvent, EventDecodeError, OrderEvent},
    errors::RepositoryError,
    model::ProductKey,
};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Why one event was not applied. None of these fail the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("event has no detail")]
    MissingDetail,

    #[error("event detail is missing `{0}`")]
    MissingKey(&'static str),

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("malformed event detail: {0}")]
    MalformedDetail(String),

    #[error("stock guard rejected the adjustment: {0}")]
    ConditionFailed(String),

    #[error("store failure: {0}")]
    Store(String),
}

impl From<EventDecodeError> for SkipReason {
    fn from(error: EventDecodeError) -> Self {
        match error {
            EventDecodeError::MissingDetail => SkipReason::MissingDetail,
            EventDecodeError::MissingKey(key) => SkipReason::MissingKey(key),
            EventDecodeError::UnknownEventType(t) => SkipReason::UnknownEventType(t),
            EventDecodeError::MalformedDetail(e) => SkipReason::MalformedDetail(e),
        }
    }
}

impl From<RepositoryError> for SkipReason {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::ConditionFailed(msg) => SkipReason::ConditionFailed(msg),
            other => SkipReason::Store(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockAdjustment {
    pub event_id: Uuid,
    pub order_id: Uuid,
    pub product: ProductKey,
    pub stock_change: i64,
    pub available: Decimal,
}

/// One entry per input event, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<Result<StockAdjustment, SkipReason>>,
}

impl BatchReport {
    pub fn applied(&self) -> usize {
        self.items.iter().filter(|r| r.is_ok()).count()
    }

    pub fn skipped(&self) -> usize {
        self.items.len() - self.applied()
    }

    pub fn skip_reasons(&self) -> Vec<&SkipReason> {
        self.items.iter().filter_map(|r| r.as_ref().err()).collect()
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
enum SkipKind {
    Decode,
    ConditionFailed,
    Store,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct SkipLabels {
    reason: SkipKind,
}

#[derive(Clone, Debug, Default)]
struct ReconcilerMetrics {
    applied: Counter,
    skipped: Family<SkipLabels, Counter>,
}

/// Turns order events into `available` adjustments through the store's
/// conditional write.
///
/// Events carry no idempotency key, so a redelivered event is applied
/// again. Two deliveries of the same `order.created` take the stock twice.
pub struct StockReconciler {
    command: DynProductCommandRepository,
    metrics: ReconcilerMetrics,
}

impl StockReconciler {
    pub fn new(command: DynProductCommandRepository, registry: &mut Registry) -> Self {
        let metrics = ReconcilerMetrics::default();

        registry.register(
            "stock_reconciler_applied",
            "Order events applied to product stock",
            metrics.applied.clone(),
        );
        registry.register(
            "stock_reconciler_skipped",
            "Order events skipped by the stock reconciler",
            metrics.skipped.clone(),
        );

        Self { command, metrics }
    }

    pub async fn apply_event(&self, event: &DomainEvent) -> Result<StockAdjustment, SkipReason> {
        let order_event = OrderEvent::try_from(event)?;
        let product = order_event.product_key();
        let stock_change = order_event.stock_change().ok_or_else(|| {
            SkipReason::MalformedDetail("quantity out of range".to_string())
        })?;

        let updated = self
            .command
            .adjust_available(&product, Decimal::from(stock_change))
            .await?;

        Ok(StockAdjustment {
            event_id: event.id,
            order_id: order_event.order_id(),
            product,
            stock_change,
            available: updated.available,
        })
    }

    pub async fn apply_batch(&self, events: Vec<DomainEvent>) -> BatchReport {
        let mut report = BatchReport::default();

        for event in events {
            let result = self.apply_event(&event).await;

            match &result {
                Ok(adjustment) => {
                    self.metrics.applied.inc();
                    info!(
                        event_id = %event.id,
                        order_id = %adjustment.order_id,
                        product = %adjustment.product,
                        stock_change = adjustment.stock_change,
                        available = %adjustment.available,
                        "📦 Stock adjusted"
                    );
                }
                Err(reason) => {
                    let kind = match reason {
                        SkipReason::ConditionFailed(_) => SkipKind::ConditionFailed,
                        SkipReason::Store(_) => SkipKind::Store,
                        _ => SkipKind::Decode,
                    };
                    self.metrics
                        .skipped
                        .get_or_create(&SkipLabels { reason: kind })
                        .inc();
                    warn!(
                        event_id = %event.id,
                        detail_type = %event.detail_type,
                        "⚠️ Skipping event: {reason}"
                    );
                }
            }

            report.items.push(result);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use shared::{
        abstract_trait::{ProductCommandRepositoryTrait, ProductQueryRepositoryTrait},
        domain::event::{OrderCreatedDetail, OrderDeletedDetail, OrderUpdatedDetail},
        model::Product as ProductModel,
        repository::MemoryStore,
    };
    use std::sync::Arc;

    async fn setup(available: i64) -> (Arc<MemoryStore>, StockReconciler, ProductModel) {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let product = store
            .create_product(&ProductModel {
                category: "tools".into(),
                id: Uuid::new_v4(),
                name: "Widget".into(),
                price: Decimal::new(999, 2),
                available: Decimal::from(available),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let reconciler = StockReconciler::new(store.clone(), &mut Registry::default());
        (store, reconciler, product)
    }

    fn created(product: &ProductModel, quantity: i64) -> DomainEvent {
        OrderEvent::Created(OrderCreatedDetail {
            order_id: Uuid::new_v4(),
            product_id: product.id,
            category: product.category.clone(),
            quantity,
        })
        .to_envelope()
        .unwrap()
    }

    async fn available(store: &MemoryStore, product: &ProductModel) -> Decimal {
        store
            .find_by_key(&product.category, product.id)
            .await
            .unwrap()
            .unwrap()
            .available
    }

    #[tokio::test]
    async fn applies_signed_deltas_per_event_type() {
        let (store, reconciler, product) = setup(10).await;
        let order_id = Uuid::new_v4();

        let updated = OrderEvent::Updated(OrderUpdatedDetail {
            order_id,
            product_id: product.id,
            category: "tools".into(),
            quantity: 5,
            old_quantity: 3,
            quantity_diff: 2,
            total: None,
        })
        .to_envelope()
        .unwrap();
        let deleted = OrderEvent::Deleted(OrderDeletedDetail {
            order_id,
            product_id: product.id,
            category: "tools".into(),
            quantity: 5,
            total: None,
        })
        .to_envelope()
        .unwrap();

        let report = reconciler
            .apply_batch(vec![created(&product, 3), updated, deleted])
            .await;

        let changes: Vec<_> = report
            .items
            .iter()
            .map(|r| r.as_ref().unwrap().stock_change)
            .collect();
        assert_eq!(changes, vec![-3, -2, 5]);
        assert_eq!(available(&store, &product).await, Decimal::from(10));
    }

    #[tokio::test]
    async fn bad_events_are_skipped_without_failing_the_batch() {
        let (store, reconciler, product) = setup(10).await;

        let mut no_detail = created(&product, 1);
        no_detail.detail = None;
        let mut no_category = created(&product, 1);
        no_category.detail = Some(json!({ "productId": product.id, "quantity": 1 }));
        let mut unknown = created(&product, 1);
        unknown.detail_type = "order.shipped".into();
        let mut malformed = created(&product, 1);
        malformed.detail = Some(json!({
            "orderId": Uuid::new_v4(),
            "productId": product.id,
            "category": "tools",
            "quantity": "lots",
        }));

        let report = reconciler
            .apply_batch(vec![
                no_detail,
                no_category,
                created(&product, 2),
                unknown,
                malformed,
            ])
            .await;

        assert_eq!(report.applied(), 1);
        assert_eq!(report.skipped(), 4);
        assert_eq!(report.skip_reasons()[0], &SkipReason::MissingDetail);
        assert_eq!(report.skip_reasons()[1], &SkipReason::MissingKey("category"));
        assert_eq!(
            report.skip_reasons()[2],
            &SkipReason::UnknownEventType("order.shipped".into())
        );
        assert!(matches!(report.skip_reasons()[3], SkipReason::MalformedDetail(_)));
        assert_eq!(available(&store, &product).await, Decimal::from(8));
    }

    #[tokio::test]
    async fn unnegatable_quantity_is_skipped_and_batch_continues() {
        let (store, reconciler, product) = setup(10).await;

        let report = reconciler
            .apply_batch(vec![created(&product, i64::MIN), created(&product, 1)])
            .await;

        assert_eq!(report.items.len(), 2);
        assert!(matches!(
            report.items[0],
            Err(SkipReason::MalformedDetail(_))
        ));
        assert_eq!(report.items[1].as_ref().unwrap().stock_change, -1);
        assert_eq!(available(&store, &product).await, Decimal::from(9));
    }

    #[tokio::test]
    async fn guard_rejects_overdraw_without_clamping() {
        let (store, reconciler, product) = setup(4).await;

        let report = reconciler
            .apply_batch(vec![created(&product, 3), created(&product, 3)])
            .await;

        assert!(report.items[0].is_ok());
        assert!(matches!(
            report.items[1],
            Err(SkipReason::ConditionFailed(_))
        ));
        assert_eq!(available(&store, &product).await, Decimal::ONE);
    }

    #[tokio::test]
    async fn event_for_missing_product_is_a_condition_failure() {
        let (_store, reconciler, product) = setup(4).await;
        let mut event = created(&product, 1);
        event.detail = Some(json!({
            "orderId": Uuid::new_v4(),
            "productId": Uuid::new_v4(),
            "category": "tools",
            "quantity": 1,
        }));

        assert!(matches!(
            reconciler.apply_event(&event).await,
            Err(SkipReason::ConditionFailed(_))
        ));
    }

    #[tokio::test]
    async fn redelivered_event_is_applied_twice() {
        let (store, reconciler, product) = setup(10).await;
        let event = created(&product, 5);

        let report = reconciler.apply_batch(vec![event.clone(), event]).await;

        assert_eq!(report.applied(), 2);
        assert_eq!(available(&store, &product).await, Decimal::ZERO);
    }
}
