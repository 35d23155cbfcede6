use super::ORDER_COLUMNS;
use crate::{
    abstract_trait::OrderCommandRepositoryTrait, config::ConnectionPool, errors::RepositoryError,
    model::Order as OrderModel, repository::TableNames,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderCommandRepository {
    db: ConnectionPool,
    table: String,
}

impl OrderCommandRepository {
    pub fn new(db: ConnectionPool, tables: &TableNames) -> Self {
        Self {
            db,
            table: tables.orders.clone(),
        }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn create_order(&self, order: &OrderModel) -> Result<OrderModel, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO {} ({ORDER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ORDER_COLUMNS}
            "#,
            self.table
        );

        let result = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(order.id)
            .bind(order.product_id)
            .bind(&order.category)
            .bind(&order.product_name)
            .bind(order.unit_price)
            .bind(order.quantity)
            .bind(order.total)
            .bind(order.created_at)
            .bind(order.updated_at)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to create order {}: {:?}", order.id, err);
                RepositoryError::from(err)
            })?;

        info!("✅ Created order {} (total {})", result.id, result.total);
        Ok(result)
    }

    async fn update_order_quantity(
        &self,
        id: Uuid,
        quantity: i64,
        total: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<OrderModel, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE {}
            SET quantity = $2, total = $3, updated_at = $4
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#,
            self.table
        );

        let result = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(id)
            .bind(quantity)
            .bind(total)
            .bind(updated_at)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to update order {id}: {err:?}");
                RepositoryError::from(err)
            })?
            .ok_or(RepositoryError::NotFound)?;

        info!("🔄 Updated order {id} to quantity {quantity}");
        Ok(result)
    }

    async fn delete_order(&self, id: Uuid) -> Result<OrderModel, RepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING {ORDER_COLUMNS}",
            self.table
        );

        let result = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to delete order {id}: {err:?}");
                RepositoryError::from(err)
            })?
            .ok_or(RepositoryError::NotFound)?;

        info!("🗑️ Deleted order {id}");
        Ok(result)
    }
}
