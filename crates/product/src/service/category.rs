use async_trait::async_trait;
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{CategoryQueryServiceTrait, DynCategoryRepository},
    errors::ServiceError,
    model::CategoryAggregate,
    utils::{Method, Metrics, TracingContext},
};

#[derive(Clone)]
pub struct CategoryQueryService {
    repository: DynCategoryRepository,
    metrics: Metrics,
}

impl CategoryQueryService {
    pub fn new(repository: DynCategoryRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "category_query_service", "CategoryQueryService");

        Self {
            repository,
            metrics,
        }
    }
}

#[async_trait]
impl CategoryQueryServiceTrait for CategoryQueryService {
    async fn find_by_category(&self, category: &str) -> Result<CategoryAggregate, ServiceError> {
        let tracing_ctx = TracingContext::start("find_category_aggregate");

        match self.repository.find_by_category(category).await {
            Ok(Some(aggregate)) => {
                tracing_ctx.complete_success(&self.metrics, Method::Get, "Aggregate fetched");
                Ok(aggregate)
            }
            Ok(None) => {
                let msg = format!("Aggregate for category \"{category}\" not found");
                tracing_ctx.complete_error(&self.metrics, Method::Get, &msg);
                Err(ServiceError::NotFound(msg))
            }
            Err(e) => {
                tracing_ctx.complete_error(&self.metrics, Method::Get, &e.to_string());
                Err(e.into())
            }
        }
    }
}
