use super::ORDER_COLUMNS;
use crate::{
    abstract_trait::OrderQueryRepositoryTrait, config::ConnectionPool, errors::RepositoryError,
    model::Order as OrderModel, repository::TableNames,
};
use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderQueryRepository {
    db: ConnectionPool,
    table: String,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool, tables: &TableNames) -> Self {
        Self {
            db,
            table: tables.orders.clone(),
        }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderModel>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM {} WHERE id = $1", self.table);

        sqlx::query_as::<_, OrderModel>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch order {id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_all(&self) -> Result<Vec<OrderModel>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM {}", self.table);

        let orders = sqlx::query_as::<_, OrderModel>(&sql)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to scan orders: {e:?}");
                RepositoryError::from(e)
            })?;

        info!("🔍 Scanned {} orders", orders.len());
        Ok(orders)
    }
}
