use async_trait::async_trait;
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynOrderQueryRepository, OrderQueryServiceTrait},
    errors::ServiceError,
    model::Order as OrderModel,
    utils::{Method, Metrics, TracingContext},
};
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    metrics: Metrics,
}

impl OrderQueryService {
    pub fn new(query: DynOrderQueryRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "order_query_service", "OrderQueryService");

        Self { query, metrics }
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_all(&self) -> Result<Vec<OrderModel>, ServiceError> {
        let tracing_ctx = TracingContext::start("find_all_orders");

        let mut orders = match self.query.find_all().await {
            Ok(orders) => orders,
            Err(e) => {
                tracing_ctx.complete_error(&self.metrics, Method::Get, &e.to_string());
                return Err(e.into());
            }
        };

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        info!("📋 Listed {} orders", orders.len());
        tracing_ctx.complete_success(&self.metrics, Method::Get, "Orders listed");
        Ok(orders)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<OrderModel, ServiceError> {
        let tracing_ctx = TracingContext::start("find_order_by_id");

        let order = match self.query.find_by_id(id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing_ctx.complete_error(&self.metrics, Method::Get, "Order not found");
                return Err(ServiceError::NotFound("Order not found".into()));
            }
            Err(e) => {
                tracing_ctx.complete_error(&self.metrics, Method::Get, &e.to_string());
                return Err(e.into());
            }
        };

        tracing_ctx.complete_success(&self.metrics, Method::Get, "Order fetched");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use shared::{abstract_trait::OrderCommandRepositoryTrait, repository::MemoryStore};
    use std::sync::Arc;

    fn order(minutes_ago: i64) -> OrderModel {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        OrderModel {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            category: "tools".into(),
            product_name: "Widget".into(),
            unit_price: Decimal::new(999, 2),
            quantity: 1,
            total: Decimal::new(999, 2),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let old = order(30);
        let mid = order(10);
        let new = order(1);
        for o in [&mid, &old, &new] {
            store.create_order(o).await.unwrap();
        }

        let service = OrderQueryService::new(store, &mut Registry::default());
        let ids: Vec<_> = service.find_all().await.unwrap().into_iter().map(|o| o.id).collect();

        assert_eq!(ids, vec![new.id, mid.id, old.id]);
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let service = OrderQueryService::new(Arc::new(MemoryStore::new()), &mut Registry::default());

        match service.find_by_id(Uuid::new_v4()).await {
            Err(ServiceError::NotFound(msg)) => assert_eq!(msg, "Order not found"),
            other => panic!("expected not found, got {other:?}"),
        }
    }
}
