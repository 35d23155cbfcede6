use crate::{
    domain::{
        change::ProductChange,
        requests::{CreateProductRequest, UpdateProductRequest},
        responses::{MessageResponse, ProductUpdateResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::{Product as ProductModel, ProductKey, ProductPatch},
};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

pub type DynProductCommandRepository = Arc<dyn ProductCommandRepositoryTrait + Send + Sync>;
pub type DynProductCommandService = Arc<dyn ProductCommandServiceTrait + Send + Sync>;
pub type DynProductChangeFeed = Arc<dyn ProductChangeFeedTrait + Send + Sync>;

#[async_trait]
pub trait ProductCommandRepositoryTrait {
    async fn create_product(&self, product: &ProductModel) -> Result<ProductModel, RepositoryError>;
    async fn update_product(
        &self,
        key: &ProductKey,
        patch: &ProductPatch,
    ) -> Result<ProductModel, RepositoryError>;
    async fn delete_product(&self, key: &ProductKey) -> Result<ProductModel, RepositoryError>;
    /// Adds `delta` to `available` only while `available >= max(0, -delta)`,
    /// checked atomically with the write. A missing product or a failed
    /// guard is `RepositoryError::ConditionFailed`.
    async fn adjust_available(
        &self,
        key: &ProductKey,
        delta: Decimal,
    ) -> Result<ProductModel, RepositoryError>;
}

/// Product row change notifications. Aggregate writes are never published.
pub trait ProductChangeFeedTrait {
    fn subscribe_changes(&self) -> broadcast::Receiver<ProductChange>;
}

#[async_trait]
pub trait ProductCommandServiceTrait {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, ServiceError>;
    async fn update_product(
        &self,
        category: &str,
        id: Uuid,
        req: &UpdateProductRequest,
    ) -> Result<ProductUpdateResponse, ServiceError>;
    async fn delete_product(&self, category: &str, id: Uuid)
    -> Result<MessageResponse, ServiceError>;
}
