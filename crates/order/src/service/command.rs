use async_trait::async_trait;
use chrono::Utc;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    abstract_trait::{
        DynOrderCommandRepository, DynOrderQueryRepository, DynProductQueryRepository,
        OrderCommandServiceTrait,
    },
    domain::{
        event::{OrderCreatedDetail, OrderDeletedDetail, OrderEvent, OrderUpdatedDetail},
        requests::{CreateOrderRequest, UpdateOrderRequest},
        responses::{OrderDeleteResponse, OrderUpdateResponse},
    },
    errors::{FieldError, RepositoryError, ServiceError},
    events::EventBus,
    model::Order as OrderModel,
    utils::{Method, Metrics, TracingContext, round_money},
};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

/// Order lifecycle. Each successful write is followed by one published
/// event; stock itself is adjusted later by the reconciler.
///
/// The stock check reads the product's current `available` and reserves
/// nothing, so concurrent orders for the same product can all pass it.
#[derive(Clone)]
pub struct OrderCommandService {
    product_query: DynProductQueryRepository,
    query: DynOrderQueryRepository,
    command: DynOrderCommandRepository,
    events: EventBus,
    metrics: Metrics,
}

pub struct OrderCommandServiceDeps {
    pub product_query: DynProductQueryRepository,
    pub query: DynOrderQueryRepository,
    pub command: DynOrderCommandRepository,
    pub events: EventBus,
}

impl OrderCommandService {
    pub fn new(deps: OrderCommandServiceDeps, registry: &mut Registry) -> Self {
        let OrderCommandServiceDeps {
            product_query,
            query,
            command,
            events,
        } = deps;

        let metrics = Metrics::new();
        metrics.register(registry, "order_command_service", "OrderCommandService");

        Self {
            product_query,
            query,
            command,
            events,
            metrics,
        }
    }

    /// The order is already stored when this runs. A failure here is
    /// reported to the caller but the order is not rolled back.
    async fn publish(&self, event: OrderEvent) -> Result<(), ServiceError> {
        if let Err(e) = self.events.publish(&event).await {
            error!(
                order_id = %event.order_id(),
                "❌ Order written but {} was not published: {e}",
                event.detail_type()
            );
            return Err(e);
        }
        Ok(())
    }

    async fn try_create_order(&self, req: &CreateOrderRequest) -> Result<OrderModel, ServiceError> {
        req.validate()?;

        let product_id = Uuid::parse_str(&req.product_id).map_err(|_| {
            ServiceError::Validation(vec![FieldError::new(
                "productId",
                "Product ID must be a valid UUID",
            )])
        })?;

        let product = self
            .product_query
            .find_by_key(&req.category, product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))?;

        let quantity = Decimal::from(req.quantity);
        if product.available < quantity {
            warn!(
                product = %product.key(),
                available = %product.available,
                requested = req.quantity,
                "Insufficient stock for new order"
            );
            return Err(ServiceError::InsufficientStock(
                "Not enough stock available".into(),
            ));
        }

        let now = Utc::now();
        let order = OrderModel {
            id: Uuid::new_v4(),
            product_id,
            category: product.category.clone(),
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity: req.quantity,
            total: round_money(product.price * quantity),
            created_at: now,
            updated_at: now,
        };

        let order = self.command.create_order(&order).await?;

        self.publish(OrderEvent::Created(OrderCreatedDetail {
            order_id: order.id,
            product_id: order.product_id,
            category: order.category.clone(),
            quantity: order.quantity,
        }))
        .await?;

        Ok(order)
    }

    async fn try_update_order(
        &self,
        id: Uuid,
        req: &UpdateOrderRequest,
    ) -> Result<OrderUpdateResponse, ServiceError> {
        req.validate()?;

        let existing = self
            .query
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".into()))?;

        if existing.quantity == req.quantity {
            return Ok(OrderUpdateResponse {
                message: "No changes detected - quantity remains unchanged".into(),
                order: existing,
            });
        }

        let product = self
            .product_query
            .find_by_key(&existing.category, existing.product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Associated product not found".into()))?;

        let quantity_diff = req.quantity - existing.quantity;
        if quantity_diff > 0 && product.available < Decimal::from(quantity_diff) {
            return Err(ServiceError::InsufficientStock(format!(
                "Not enough stock available. Only {} left.",
                product.available.normalize()
            )));
        }

        let total = round_money(existing.unit_price * Decimal::from(req.quantity));

        let order = self
            .command
            .update_order_quantity(id, req.quantity, total, Utc::now())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("Order not found".into()),
                other => other.into(),
            })?;

        self.publish(OrderEvent::Updated(OrderUpdatedDetail {
            order_id: order.id,
            product_id: order.product_id,
            category: order.category.clone(),
            quantity: order.quantity,
            old_quantity: existing.quantity,
            quantity_diff,
            total: Some(order.total),
        }))
        .await?;

        Ok(OrderUpdateResponse {
            message: "Order quantity updated successfully".into(),
            order,
        })
    }

    async fn try_delete_order(&self, id: Uuid) -> Result<OrderDeleteResponse, ServiceError> {
        let not_found = || ServiceError::NotFound("Order not found".into());

        self.query.find_by_id(id).await?.ok_or_else(not_found)?;

        let deleted = self.command.delete_order(id).await.map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => other.into(),
        })?;

        self.publish(OrderEvent::Deleted(OrderDeletedDetail {
            order_id: deleted.id,
            product_id: deleted.product_id,
            category: deleted.category.clone(),
            quantity: deleted.quantity,
            total: Some(deleted.total),
        }))
        .await?;

        Ok(OrderDeleteResponse {
            message: "Order deleted successfully".into(),
            deleted_order: deleted,
        })
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn create_order(&self, req: &CreateOrderRequest) -> Result<OrderModel, ServiceError> {
        info!(product_id = %req.product_id, quantity = req.quantity, "🏗️ Creating order");
        let tracing_ctx = TracingContext::start("create_order");

        let result = self.try_create_order(req).await;
        match &result {
            Ok(order) => tracing_ctx.complete_success(
                &self.metrics,
                Method::Post,
                &format!("Order {} created", order.id),
            ),
            Err(e) => tracing_ctx.complete_error(&self.metrics, Method::Post, &e.to_string()),
        }
        result
    }

    async fn update_order(
        &self,
        id: Uuid,
        req: &UpdateOrderRequest,
    ) -> Result<OrderUpdateResponse, ServiceError> {
        info!(order_id = %id, quantity = req.quantity, "✏️ Updating order");
        let tracing_ctx = TracingContext::start("update_order");

        let result = self.try_update_order(id, req).await;
        match &result {
            Ok(res) => tracing_ctx.complete_success(&self.metrics, Method::Put, &res.message),
            Err(e) => tracing_ctx.complete_error(&self.metrics, Method::Put, &e.to_string()),
        }
        result
    }

    async fn delete_order(&self, id: Uuid) -> Result<OrderDeleteResponse, ServiceError> {
        info!(order_id = %id, "🗑️ Deleting order");
        let tracing_ctx = TracingContext::start("delete_order");

        let result = self.try_delete_order(id).await;
        match &result {
            Ok(res) => tracing_ctx.complete_success(&self.metrics, Method::Delete, &res.message),
            Err(e) => tracing_ctx.complete_error(&self.metrics, Method::Delete, &e.to_string()),
        }
        result
    }
}
