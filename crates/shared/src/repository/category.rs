use crate::{
    abstract_trait::CategoryRepositoryTrait, config::ConnectionPool, errors::RepositoryError,
    model::CategoryAggregate, repository::TableNames,
};
use async_trait::async_trait;
use tracing::{error, info};

const CATEGORY_COLUMNS: &str =
    "category, id, total_availability, product_ids, created_at, updated_at";

/// Aggregates live in their own table so writing them never fires the
/// product change trigger.
#[derive(Clone)]
pub struct CategoryRepository {
    db: ConnectionPool,
    table: String,
}

impl CategoryRepository {
    pub fn new(db: ConnectionPool, tables: &TableNames) -> Self {
        Self {
            db,
            table: tables.categories(),
        }
    }
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    async fn find_by_category(
        &self,
        category: &str,
    ) -> Result<Option<CategoryAggregate>, RepositoryError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM {} WHERE category = $1",
            self.table
        );

        sqlx::query_as::<_, CategoryAggregate>(&sql)
            .bind(category)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch aggregate {category}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_all(&self) -> Result<Vec<CategoryAggregate>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM {} ORDER BY category", self.table);

        sqlx::query_as::<_, CategoryAggregate>(&sql)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to scan aggregates: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn put_aggregate(
        &self,
        aggregate: &CategoryAggregate,
    ) -> Result<CategoryAggregate, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO {} ({CATEGORY_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (category) DO UPDATE
            SET total_availability = EXCLUDED.total_availability,
                product_ids = EXCLUDED.product_ids,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {CATEGORY_COLUMNS}
            "#,
            self.table
        );

        let result = sqlx::query_as::<_, CategoryAggregate>(&sql)
            .bind(&aggregate.category)
            .bind(&aggregate.id)
            .bind(aggregate.total_availability)
            .bind(&aggregate.product_ids)
            .bind(aggregate.created_at)
            .bind(aggregate.updated_at)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to write aggregate {}: {e:?}", aggregate.category);
                RepositoryError::from(e)
            })?;

        info!("📊 Stored aggregate for {}", result.category);
        Ok(result)
    }

    async fn delete_aggregate(&self, category: &str) -> Result<bool, RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE category = $1", self.table);

        let result = sqlx::query(&sql)
            .bind(category)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to delete aggregate {category}: {e:?}");
                RepositoryError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
