use async_trait::async_trait;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    abstract_trait::{DynProductQueryRepository, ProductQueryServiceTrait},
    domain::requests::{AvailableStatus, FindAllProducts, SortOrder},
    errors::ServiceError,
    model::Product as ProductModel,
    utils::{Method, Metrics, TracingContext},
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct ProductQueryService {
    query: DynProductQueryRepository,
    metrics: Metrics,
}

impl ProductQueryService {
    pub fn new(query: DynProductQueryRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "product_query_service", "ProductQueryService");

        Self { query, metrics }
    }

    async fn try_find_all(&self, req: &FindAllProducts) -> Result<Vec<ProductModel>, ServiceError> {
        req.validate()?;

        let products = match req.category.as_deref() {
            Some(category) => self.query.find_by_category(category).await?,
            None => self.query.find_all().await?,
        };

        let mut products: Vec<_> = products
            .into_iter()
            .filter(|p| matches_filters(req, p))
            .collect();

        if let Some(order) = req.sort_order {
            products.sort_by(|a, b| match order {
                SortOrder::Asc => a.price.cmp(&b.price),
                SortOrder::Desc => b.price.cmp(&a.price),
            });
        }

        Ok(products)
    }
}

fn matches_filters(req: &FindAllProducts, product: &ProductModel) -> bool {
    if let Some(name) = &req.name
        && !product.name.to_lowercase().contains(&name.to_lowercase())
    {
        return false;
    }

    let in_range = |value: Decimal, min: Option<Decimal>, max: Option<Decimal>| {
        min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
    };

    if !in_range(product.price, req.min_price, req.max_price) {
        return false;
    }
    if !in_range(product.available, req.min_available, req.max_available) {
        return false;
    }

    match req.available_status {
        Some(AvailableStatus::InStock) => product.available > Decimal::ZERO,
        Some(AvailableStatus::OutOfStock) => product.available.is_zero(),
        None => true,
    }
}

#[async_trait]
impl ProductQueryServiceTrait for ProductQueryService {
    async fn find_all(&self, req: &FindAllProducts) -> Result<Vec<ProductModel>, ServiceError> {
        info!(category = ?req.category, "🔍 Listing products");
        let tracing_ctx = TracingContext::start("find_all_products");

        let result = self.try_find_all(req).await;
        match &result {
            Ok(products) => tracing_ctx.complete_success(
                &self.metrics,
                Method::Get,
                &format!("Listed {} products", products.len()),
            ),
            Err(e) => tracing_ctx.complete_error(&self.metrics, Method::Get, &e.to_string()),
        }
        result
    }

    async fn find_by_key(&self, category: &str, id: Uuid) -> Result<ProductModel, ServiceError> {
        let tracing_ctx = TracingContext::start("find_product_by_key");

        let product = match self.query.find_by_key(category, id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                tracing_ctx.complete_error(&self.metrics, Method::Get, "Product not found");
                return Err(ServiceError::NotFound("Product not found".into()));
            }
            Err(e) => {
                tracing_ctx.complete_error(&self.metrics, Method::Get, &e.to_string());
                return Err(e.into());
            }
        };

        tracing_ctx.complete_success(&self.metrics, Method::Get, "Product fetched");
        Ok(product)
    }
}
