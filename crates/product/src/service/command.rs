use async_trait::async_trait;
use chrono::Utc;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    abstract_trait::{
        DynProductCommandRepository, DynProductQueryRepository, ProductCommandServiceTrait,
    },
    domain::{
        requests::{CreateProductRequest, UpdateProductRequest},
        responses::{MessageResponse, ProductUpdateResponse},
    },
    errors::{FieldError, RepositoryError, ServiceError},
    model::{Product as ProductModel, ProductKey, ProductPatch},
    utils::{Method, Metrics, TracingContext},
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct ProductCommandService {
    query: DynProductQueryRepository,
    command: DynProductCommandRepository,
    metrics: Metrics,
}

impl ProductCommandService {
    pub fn new(
        query: DynProductQueryRepository,
        command: DynProductCommandRepository,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "product_command_service", "ProductCommandService");

        Self {
            query,
            command,
            metrics,
        }
    }

    async fn try_create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, ServiceError> {
        req.validate()?;

        let now = Utc::now();
        let product = ProductModel {
            category: req.category.clone(),
            id: Uuid::new_v4(),
            name: req.name.clone(),
            price: req.price,
            available: req.available.unwrap_or(Decimal::ZERO),
            created_at: now,
            updated_at: now,
        };

        Ok(self.command.create_product(&product).await?)
    }

    async fn try_update_product(
        &self,
        category: &str,
        id: Uuid,
        req: &UpdateProductRequest,
    ) -> Result<ProductUpdateResponse, ServiceError> {
        req.validate()?;

        if let Some(new_category) = &req.category
            && new_category.trim() != category.trim()
        {
            return Err(ServiceError::Validation(vec![FieldError::new(
                "category",
                "Category cannot be changed",
            )]));
        }

        let existing = self
            .query
            .find_by_key(category, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))?;

        let patch = changed_fields(req, &existing);
        let changed = field_names(&patch);

        if changed.is_empty() {
            return Ok(ProductUpdateResponse {
                message: "No changes detected - product remains unchanged".into(),
                changed_fields: None,
                product: existing,
            });
        }

        let product = self
            .command
            .update_product(&ProductKey::new(category, id), &patch)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("Product not found".into()),
                other => other.into(),
            })?;

        Ok(ProductUpdateResponse {
            message: "Product updated successfully".into(),
            changed_fields: Some(changed),
            product,
        })
    }

    async fn try_delete_product(
        &self,
        category: &str,
        id: Uuid,
    ) -> Result<MessageResponse, ServiceError> {
        self.command
            .delete_product(&ProductKey::new(category, id))
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("Product not found".into()),
                other => other.into(),
            })?;

        Ok(MessageResponse::new("Product deleted successfully"))
    }
}

/// Keeps only the fields whose value differs from the stored product.
/// Names compare trimmed.
fn changed_fields(req: &UpdateProductRequest, existing: &ProductModel) -> ProductPatch {
    ProductPatch {
        name: req
            .name
            .as_ref()
            .filter(|name| name.trim() != existing.name.trim())
            .cloned(),
        price: req.price.filter(|price| *price != existing.price),
        available: req
            .available
            .filter(|available| *available != existing.available),
        updated_at: Utc::now(),
    }
}

fn field_names(patch: &ProductPatch) -> Vec<String> {
    let mut fields = Vec::new();
    if patch.name.is_some() {
        fields.push("name".to_string());
    }
    if patch.price.is_some() {
        fields.push("price".to_string());
    }
    if patch.available.is_some() {
        fields.push("available".to_string());
    }
    fields
}

#[async_trait]
impl ProductCommandServiceTrait for ProductCommandService {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, ServiceError> {
        info!(category = %req.category, name = %req.name, "🏗️ Creating product");
        let tracing_ctx = TracingContext::start("create_product");

        let result = self.try_create_product(req).await;
        match &result {
            Ok(product) => tracing_ctx.complete_success(
                &self.metrics,
                Method::Post,
                &format!("Product {} created", product.key()),
            ),
            Err(e) => tracing_ctx.complete_error(&self.metrics, Method::Post, &e.to_string()),
        }
        result
    }

    async fn update_product(
        &self,
        category: &str,
        id: Uuid,
        req: &UpdateProductRequest,
    ) -> Result<ProductUpdateResponse, ServiceError> {
        info!(%category, %id, "✏️ Updating product");
        let tracing_ctx = TracingContext::start("update_product");

        let result = self.try_update_product(category, id, req).await;
        match &result {
            Ok(res) => tracing_ctx.complete_success(&self.metrics, Method::Put, &res.message),
            Err(e) => tracing_ctx.complete_error(&self.metrics, Method::Put, &e.to_string()),
        }
        result
    }

    async fn delete_product(
        &self,
        category: &str,
        id: Uuid,
    ) -> Result<MessageResponse, ServiceError> {
        info!(%category, %id, "🗑️ Deleting product");
        let tracing_ctx = TracingContext::start("delete_product");

        let result = self.try_delete_product(category, id).await;
        match &result {
            Ok(res) => tracing_ctx.complete_success(&self.metrics, Method::Delete, &res.message),
            Err(e) => tracing_ctx.complete_error(&self.metrics, Method::Delete, &e.to_string()),
        }
        result
    }
}
