use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use shared::{
    abstract_trait::{DynCategoryRepository, DynProductQueryRepository},
    domain::change::ProductChange,
    errors::RepositoryError,
    model::CategoryAggregate,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutcome {
    Created(CategoryAggregate),
    Updated(CategoryAggregate),
    Deleted,
    /// Category has no products and no aggregate record.
    Absent,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct AggregateReport {
    pub outcomes: BTreeMap<String, AggregateOutcome>,
}

impl AggregateReport {
    pub fn failed(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| matches!(o, AggregateOutcome::Failed(_)))
            .count()
    }
}

/// Keeps one availability summary per category in step with the products
/// in that category.
///
/// Every affected category is recomputed from a fresh partition read, so
/// replaying a batch or recomputing an untouched category rewrites the same
/// totals and ids.
#[derive(Clone)]
pub struct CategoryAggregator {
    products: DynProductQueryRepository,
    categories: DynCategoryRepository,
}

impl CategoryAggregator {
    pub fn new(products: DynProductQueryRepository, categories: DynCategoryRepository) -> Self {
        Self {
            products,
            categories,
        }
    }

    pub async fn reconcile(&self, changes: &[ProductChange]) -> AggregateReport {
        let categories: BTreeSet<String> = changes
            .iter()
            .flat_map(|change| change.categories())
            .map(str::to_string)
            .collect();

        self.recompute(categories).await
    }

    /// Rebuilds every category that has products or an aggregate. Used when
    /// change notifications were dropped.
    pub async fn recompute_all(&self) -> Result<AggregateReport, RepositoryError> {
        let mut categories: BTreeSet<String> = self
            .products
            .find_all()
            .await?
            .into_iter()
            .map(|p| p.category)
            .collect();
        categories.extend(
            self.categories
                .find_all()
                .await?
                .into_iter()
                .map(|a| a.category),
        );

        Ok(self.recompute(categories).await)
    }

    async fn recompute(&self, categories: BTreeSet<String>) -> AggregateReport {
        let results = join_all(categories.into_iter().map(|category| async move {
            let outcome = match self.recompute_category(&category).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(category = %category, "❌ Failed to recompute aggregate: {e}");
                    AggregateOutcome::Failed(e.to_string())
                }
            };
            (category, outcome)
        }))
        .await;

        AggregateReport {
            outcomes: results.into_iter().collect(),
        }
    }

    pub async fn recompute_category(
        &self,
        category: &str,
    ) -> Result<AggregateOutcome, RepositoryError> {
        let products = self.products.find_by_category(category).await?;

        if products.is_empty() {
            return if self.categories.delete_aggregate(category).await? {
                info!(category, "🗑️ Aggregate removed");
                Ok(AggregateOutcome::Deleted)
            } else {
                Ok(AggregateOutcome::Absent)
            };
        }

        let total: Decimal = products.iter().map(|p| p.available).sum();
        let mut product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        product_ids.sort();

        let now = Utc::now();
        let outcome = match self.categories.find_by_category(category).await? {
            Some(existing) => {
                let aggregate = CategoryAggregate {
                    total_availability: total,
                    product_ids,
                    updated_at: now,
                    ..existing
                };
                AggregateOutcome::Updated(self.categories.put_aggregate(&aggregate).await?)
            }
            None => {
                let aggregate = CategoryAggregate::new(category, total, product_ids, now);
                AggregateOutcome::Created(self.categories.put_aggregate(&aggregate).await?)
            }
        };

        info!(
            category,
            total_availability = %total,
            "📊 Aggregate recomputed"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        abstract_trait::{CategoryRepositoryTrait, ProductCommandRepositoryTrait},
        model::{Product, ProductKey, ProductPatch},
        repository::MemoryStore,
    };
    use std::sync::Arc;

    fn product(category: &str, available: i64) -> Product {
        let now = Utc::now();
        Product {
            category: category.into(),
            id: Uuid::new_v4(),
            name: "Widget".into(),
            price: Decimal::new(500, 2),
            available: Decimal::from(available),
            created_at: now,
            updated_at: now,
        }
    }

    fn setup() -> (Arc<MemoryStore>, CategoryAggregator) {
        let store = Arc::new(MemoryStore::new());
        let aggregator = CategoryAggregator::new(store.clone(), store.clone());
        (store, aggregator)
    }

    async fn aggregate(store: &MemoryStore, category: &str) -> Option<CategoryAggregate> {
        CategoryRepositoryTrait::find_by_category(store, category)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn sums_availability_and_sorts_ids() {
        let (store, aggregator) = setup();
        let a = store.create_product(&product("tools", 3)).await.unwrap();
        let b = store.create_product(&product("tools", 4)).await.unwrap();
        store.create_product(&product("garden", 9)).await.unwrap();

        let report = aggregator
            .reconcile(&[ProductChange::insert(a.clone()), ProductChange::insert(b.clone())])
            .await;

        assert_eq!(report.outcomes.len(), 1);
        assert!(matches!(report.outcomes["tools"], AggregateOutcome::Created(_)));

        let agg = aggregate(&store, "tools").await.unwrap();
        let mut ids = vec![a.id, b.id];
        ids.sort();
        assert_eq!(agg.total_availability, Decimal::from(7));
        assert_eq!(agg.product_ids, ids);
        assert!(aggregate(&store, "garden").await.is_none());
    }

    #[tokio::test]
    async fn recompute_preserves_created_at_and_is_stable() {
        let (store, aggregator) = setup();
        let a = store.create_product(&product("tools", 3)).await.unwrap();
        aggregator.reconcile(&[ProductChange::insert(a.clone())]).await;
        let first = aggregate(&store, "tools").await.unwrap();

        let report = aggregator.reconcile(&[ProductChange::insert(a)]).await;
        assert!(matches!(report.outcomes["tools"], AggregateOutcome::Updated(_)));

        let second = aggregate(&store, "tools").await.unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.total_availability, first.total_availability);
        assert_eq!(second.product_ids, first.product_ids);
    }

    #[tokio::test]
    async fn category_move_updates_both_sides() {
        let (store, aggregator) = setup();
        let moved = store.create_product(&product("tools", 3)).await.unwrap();
        let stays = store.create_product(&product("tools", 2)).await.unwrap();
        aggregator
            .reconcile(&[
                ProductChange::insert(moved.clone()),
                ProductChange::insert(stays.clone()),
            ])
            .await;

        store.delete_product(&moved.key()).await.unwrap();
        let relocated = store
            .create_product(&Product {
                category: "garden".into(),
                ..moved.clone()
            })
            .await
            .unwrap();

        let report = aggregator
            .reconcile(&[ProductChange::modify(moved, relocated.clone())])
            .await;

        assert_eq!(report.outcomes.len(), 2);
        let tools = aggregate(&store, "tools").await.unwrap();
        assert_eq!(tools.total_availability, Decimal::from(2));
        assert_eq!(tools.product_ids, vec![stays.id]);
        let garden = aggregate(&store, "garden").await.unwrap();
        assert_eq!(garden.product_ids, vec![relocated.id]);
    }

    #[tokio::test]
    async fn empty_category_removes_aggregate() {
        let (store, aggregator) = setup();
        let a = store.create_product(&product("tools", 3)).await.unwrap();
        aggregator.reconcile(&[ProductChange::insert(a.clone())]).await;

        let removed = store.delete_product(&a.key()).await.unwrap();
        let report = aggregator.reconcile(&[ProductChange::remove(removed.clone())]).await;
        assert_eq!(report.outcomes["tools"], AggregateOutcome::Deleted);
        assert!(aggregate(&store, "tools").await.is_none());

        let report = aggregator.reconcile(&[ProductChange::remove(removed)]).await;
        assert_eq!(report.outcomes["tools"], AggregateOutcome::Absent);
    }

    #[tokio::test]
    async fn recompute_all_catches_up_missed_changes() {
        let (store, aggregator) = setup();
        let a = store.create_product(&product("tools", 3)).await.unwrap();
        aggregator.reconcile(&[ProductChange::insert(a.clone())]).await;

        store
            .adjust_available(&ProductKey::new("tools", a.id), Decimal::from(-1))
            .await
            .unwrap();
        store.create_product(&product("garden", 5)).await.unwrap();
        store
            .update_product(
                &a.key(),
                &ProductPatch {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let report = aggregator.recompute_all().await.unwrap();

        assert_eq!(report.failed(), 0);
        assert_eq!(
            aggregate(&store, "tools").await.unwrap().total_availability,
            Decimal::from(2)
        );
        assert_eq!(
            aggregate(&store, "garden").await.unwrap().total_availability,
            Decimal::from(5)
        );
    }
}
