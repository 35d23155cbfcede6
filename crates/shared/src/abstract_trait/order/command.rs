use crate::{
    domain::{
        requests::{CreateOrderRequest, UpdateOrderRequest},
        responses::{OrderDeleteResponse, OrderUpdateResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::Order as OrderModel,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;
pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandRepositoryTrait {
    async fn create_order(&self, order: &OrderModel) -> Result<OrderModel, RepositoryError>;
    async fn update_order_quantity(
        &self,
        id: Uuid,
        quantity: i64,
        total: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<OrderModel, RepositoryError>;
    async fn delete_order(&self, id: Uuid) -> Result<OrderModel, RepositoryError>;
}

#[async_trait]
pub trait OrderCommandServiceTrait {
    async fn create_order(&self, req: &CreateOrderRequest) -> Result<OrderModel, ServiceError>;
    async fn update_order(
        &self,
        id: Uuid,
        req: &UpdateOrderRequest,
    ) -> Result<OrderUpdateResponse, ServiceError>;
    async fn delete_order(&self, id: Uuid) -> Result<OrderDeleteResponse, ServiceError>;
}
