use crate::{
    domain::requests::FindAllProducts,
    errors::{RepositoryError, ServiceError},
    model::Product as ProductModel,
};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type DynProductQueryRepository = Arc<dyn ProductQueryRepositoryTrait + Send + Sync>;
pub type DynProductQueryService = Arc<dyn ProductQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait ProductQueryRepositoryTrait {
    async fn find_by_key(
        &self,
        category: &str,
        id: Uuid,
    ) -> Result<Option<ProductModel>, RepositoryError>;
    /// Query by partition, ordered by id.
    async fn find_by_category(&self, category: &str) -> Result<Vec<ProductModel>, RepositoryError>;
    /// Full scan.
    async fn find_all(&self) -> Result<Vec<ProductModel>, RepositoryError>;
}

#[async_trait]
pub trait ProductQueryServiceTrait {
    async fn find_all(&self, req: &FindAllProducts) -> Result<Vec<ProductModel>, ServiceError>;
    async fn find_by_key(&self, category: &str, id: Uuid) -> Result<ProductModel, ServiceError>;
}
