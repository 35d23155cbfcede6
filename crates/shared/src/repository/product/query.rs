use super::PRODUCT_COLUMNS;
use crate::{
    abstract_trait::ProductQueryRepositoryTrait, config::ConnectionPool, errors::RepositoryError,
    model::Product as ProductModel, repository::TableNames,
};
use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProductQueryRepository {
    db: ConnectionPool,
    table: String,
}

impl ProductQueryRepository {
    pub fn new(db: ConnectionPool, tables: &TableNames) -> Self {
        Self {
            db,
            table: tables.products.clone(),
        }
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for ProductQueryRepository {
    async fn find_by_key(
        &self,
        category: &str,
        id: Uuid,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM {} WHERE category = $1 AND id = $2",
            self.table
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(category)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch product {category}/{id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<ProductModel>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM {} WHERE category = $1 ORDER BY id",
            self.table
        );

        let products = sqlx::query_as::<_, ProductModel>(&sql)
            .bind(category)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to query category {category}: {e:?}");
                RepositoryError::from(e)
            })?;

        info!("🔍 Found {} products in category {category}", products.len());
        Ok(products)
    }

    async fn find_all(&self) -> Result<Vec<ProductModel>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM {} ORDER BY category, id",
            self.table
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to scan products: {e:?}");
                RepositoryError::from(e)
            })
    }
}
