use super::PRODUCT_COLUMNS;
use crate::{
    abstract_trait::ProductCommandRepositoryTrait,
    config::ConnectionPool,
    errors::RepositoryError,
    model::{Product as ProductModel, ProductKey, ProductPatch},
    repository::TableNames,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Product writes. Change records come from the table trigger, so nothing
/// here publishes them directly.
#[derive(Clone)]
pub struct ProductCommandRepository {
    db: ConnectionPool,
    table: String,
}

impl ProductCommandRepository {
    pub fn new(db: ConnectionPool, tables: &TableNames) -> Self {
        Self {
            db,
            table: tables.products.clone(),
        }
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for ProductCommandRepository {
    async fn create_product(&self, product: &ProductModel) -> Result<ProductModel, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO {} ({PRODUCT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#,
            self.table
        );

        let result = sqlx::query_as::<_, ProductModel>(&sql)
            .bind(&product.category)
            .bind(product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(product.available)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to create product {}: {:?}", product.name, err);
                RepositoryError::from(err)
            })?;

        info!("✅ Created product {} ({})", result.key(), result.name);
        Ok(result)
    }

    async fn update_product(
        &self,
        key: &ProductKey,
        patch: &ProductPatch,
    ) -> Result<ProductModel, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE {}
            SET name = COALESCE($3, name),
                price = COALESCE($4, price),
                available = COALESCE($5, available),
                updated_at = $6
            WHERE category = $1 AND id = $2
            RETURNING {PRODUCT_COLUMNS}
            "#,
            self.table
        );

        let result = sqlx::query_as::<_, ProductModel>(&sql)
            .bind(&key.category)
            .bind(key.id)
            .bind(patch.name.as_deref())
            .bind(patch.price)
            .bind(patch.available)
            .bind(patch.updated_at)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to update product {key}: {err:?}");
                RepositoryError::from(err)
            })?
            .ok_or(RepositoryError::NotFound)?;

        info!("🔄 Updated product {key}");
        Ok(result)
    }

    async fn delete_product(&self, key: &ProductKey) -> Result<ProductModel, RepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE category = $1 AND id = $2 RETURNING {PRODUCT_COLUMNS}",
            self.table
        );

        let result = sqlx::query_as::<_, ProductModel>(&sql)
            .bind(&key.category)
            .bind(key.id)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to delete product {key}: {err:?}");
                RepositoryError::from(err)
            })?
            .ok_or(RepositoryError::NotFound)?;

        info!("🗑️ Deleted product {key}");
        Ok(result)
    }

    async fn adjust_available(
        &self,
        key: &ProductKey,
        delta: Decimal,
    ) -> Result<ProductModel, RepositoryError> {
        let floor = (-delta).max(Decimal::ZERO);
        let sql = format!(
            r#"
            UPDATE {}
            SET available = available + $3
            WHERE category = $1 AND id = $2 AND available >= $4
            RETURNING {PRODUCT_COLUMNS}
            "#,
            self.table
        );

        let result = sqlx::query_as::<_, ProductModel>(&sql)
            .bind(&key.category)
            .bind(key.id)
            .bind(delta)
            .bind(floor)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to adjust stock for {key}: {err:?}");
                RepositoryError::from(err)
            })?;

        match result {
            Some(product) => {
                info!("📦 Adjusted stock for {key} by {delta} (now {})", product.available);
                Ok(product)
            }
            None => {
                warn!("⚠️ Stock guard rejected {delta} for {key}");
                Err(RepositoryError::ConditionFailed(format!(
                    "product {key} missing or available below {floor}"
                )))
            }
        }
    }
}
