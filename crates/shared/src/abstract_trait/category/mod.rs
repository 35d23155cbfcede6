use crate::{
    errors::{RepositoryError, ServiceError},
    model::CategoryAggregate,
};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub type DynCategoryRepository = Arc<dyn CategoryRepositoryTrait + Send + Sync>;
pub type DynCategoryQueryService = Arc<dyn CategoryQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait CategoryRepositoryTrait {
    async fn find_by_category(
        &self,
        category: &str,
    ) -> Result<Option<CategoryAggregate>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<CategoryAggregate>, RepositoryError>;
    async fn put_aggregate(
        &self,
        aggregate: &CategoryAggregate,
    ) -> Result<CategoryAggregate, RepositoryError>;
    /// Returns whether a record was removed.
    async fn delete_aggregate(&self, category: &str) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait CategoryQueryServiceTrait {
    async fn find_by_category(&self, category: &str) -> Result<CategoryAggregate, ServiceError>;
}
