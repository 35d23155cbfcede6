use crate::{
    errors::{RepositoryError, ServiceError},
    model::Order as OrderModel,
};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;
pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderModel>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<OrderModel>, RepositoryError>;
}

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn find_all(&self) -> Result<Vec<OrderModel>, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<OrderModel, ServiceError>;
}
