use crate::{
    abstract_trait::{
        CategoryRepositoryTrait, OrderCommandRepositoryTrait, OrderQueryRepositoryTrait,
        ProductChangeFeedTrait, ProductCommandRepositoryTrait, ProductQueryRepositoryTrait,
    },
    domain::change::ProductChange,
    errors::RepositoryError,
    model::{CategoryAggregate, Order as OrderModel, Product as ProductModel, ProductKey, ProductPatch},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, warn};
use uuid::Uuid;

const CHANGE_FEED_CAPACITY: usize = 1024;

/// Process-local store backing every repository trait. Each write takes the
/// collection's write lock, so a conditional update is checked and applied
/// without interleaving.
pub struct MemoryStore {
    products: RwLock<BTreeMap<ProductKey, ProductModel>>,
    orders: RwLock<HashMap<Uuid, OrderModel>>,
    categories: RwLock<BTreeMap<String, CategoryAggregate>>,
    changes: broadcast::Sender<ProductChange>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            products: RwLock::new(BTreeMap::new()),
            orders: RwLock::new(HashMap::new()),
            categories: RwLock::new(BTreeMap::new()),
            changes,
        }
    }

    fn emit(&self, change: ProductChange) {
        // No subscribers is fine; nothing is aggregating yet.
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for MemoryStore {
    async fn find_by_key(
        &self,
        category: &str,
        id: Uuid,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&ProductKey::new(category, id)).cloned())
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<ProductModel>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<ProductModel>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.values().cloned().collect())
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for MemoryStore {
    async fn create_product(&self, product: &ProductModel) -> Result<ProductModel, RepositoryError> {
        let mut products = self.products.write().await;
        let key = product.key();

        if products.contains_key(&key) {
            return Err(RepositoryError::Custom(format!("product {key} already exists")));
        }

        products.insert(key, product.clone());
        self.emit(ProductChange::insert(product.clone()));

        debug!(key = %product.key(), "product inserted");
        Ok(product.clone())
    }

    async fn update_product(
        &self,
        key: &ProductKey,
        patch: &ProductPatch,
    ) -> Result<ProductModel, RepositoryError> {
        let mut products = self.products.write().await;
        let product = products.get_mut(key).ok_or(RepositoryError::NotFound)?;

        let old = product.clone();
        patch.apply(product);
        let new = product.clone();

        self.emit(ProductChange::modify(old, new.clone()));
        Ok(new)
    }

    async fn delete_product(&self, key: &ProductKey) -> Result<ProductModel, RepositoryError> {
        let mut products = self.products.write().await;
        let removed = products.remove(key).ok_or(RepositoryError::NotFound)?;

        self.emit(ProductChange::remove(removed.clone()));
        Ok(removed)
    }

    async fn adjust_available(
        &self,
        key: &ProductKey,
        delta: Decimal,
    ) -> Result<ProductModel, RepositoryError> {
        let mut products = self.products.write().await;

        let Some(product) = products.get_mut(key) else {
            return Err(RepositoryError::ConditionFailed(format!(
                "product {key} does not exist"
            )));
        };

        let floor = (-delta).max(Decimal::ZERO);
        if product.available < floor {
            warn!(%key, available = %product.available, %delta, "stock guard rejected adjustment");
            return Err(RepositoryError::ConditionFailed(format!(
                "available {} is below {floor}",
                product.available
            )));
        }

        let old = product.clone();
        product.available += delta;
        let new = product.clone();

        self.emit(ProductChange::modify(old, new.clone()));
        Ok(new)
    }
}

impl ProductChangeFeedTrait for MemoryStore {
    fn subscribe_changes(&self) -> broadcast::Receiver<ProductChange> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderModel>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<OrderModel>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for MemoryStore {
    async fn create_order(&self, order: &OrderModel) -> Result<OrderModel, RepositoryError> {
        let mut orders = self.orders.write().await;

        if orders.contains_key(&order.id) {
            return Err(RepositoryError::Custom(format!(
                "order {} already exists",
                order.id
            )));
        }

        orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn update_order_quantity(
        &self,
        id: Uuid,
        quantity: i64,
        total: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<OrderModel, RepositoryError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        order.quantity = quantity;
        order.total = total;
        order.updated_at = updated_at;

        Ok(order.clone())
    }

    async fn delete_order(&self, id: Uuid) -> Result<OrderModel, RepositoryError> {
        let mut orders = self.orders.write().await;
        orders.remove(&id).ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl CategoryRepositoryTrait for MemoryStore {
    async fn find_by_category(
        &self,
        category: &str,
    ) -> Result<Option<CategoryAggregate>, RepositoryError> {
        let categories = self.categories.read().await;
        Ok(categories.get(category).cloned())
    }

    async fn find_all(&self) -> Result<Vec<CategoryAggregate>, RepositoryError> {
        let categories = self.categories.read().await;
        Ok(categories.values().cloned().collect())
    }

    async fn put_aggregate(
        &self,
        aggregate: &CategoryAggregate,
    ) -> Result<CategoryAggregate, RepositoryError> {
        let mut categories = self.categories.write().await;
        categories.insert(aggregate.category.clone(), aggregate.clone());
        Ok(aggregate.clone())
    }

    async fn delete_aggregate(&self, category: &str) -> Result<bool, RepositoryError> {
        let mut categories = self.categories.write().await;
        Ok(categories.remove(category).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change::ChangeKind;
    use std::sync::Arc;

    fn product(category: &str, available: i64) -> ProductModel {
        let now = Utc::now();
        ProductModel {
            category: category.into(),
            id: Uuid::new_v4(),
            name: "Widget".into(),
            price: Decimal::new(999, 2),
            available: Decimal::from(available),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn adjust_available_guards_against_negative_stock() {
        let store = MemoryStore::new();
        let p = store.create_product(&product("tools", 3)).await.unwrap();

        let after = store.adjust_available(&p.key(), Decimal::from(-3)).await.unwrap();
        assert_eq!(after.available, Decimal::ZERO);

        let rejected = store.adjust_available(&p.key(), Decimal::from(-1)).await;
        assert!(matches!(rejected, Err(RepositoryError::ConditionFailed(_))));

        let stored = store.find_by_key("tools", p.id).await.unwrap().unwrap();
        assert_eq!(stored.available, Decimal::ZERO);
        assert_eq!(stored.updated_at, p.updated_at);

        let restocked = store.adjust_available(&p.key(), Decimal::from(4)).await.unwrap();
        assert_eq!(restocked.available, Decimal::from(4));
    }

    #[tokio::test]
    async fn adjust_available_on_missing_product_is_a_condition_failure() {
        let store = MemoryStore::new();
        let key = ProductKey::new("tools", Uuid::new_v4());

        let result = store.adjust_available(&key, Decimal::from(5)).await;
        assert!(matches!(result, Err(RepositoryError::ConditionFailed(_))));
    }

    #[tokio::test]
    async fn concurrent_decrements_on_last_unit_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let p = store.create_product(&product("tools", 1)).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let key = p.key();
                tokio::spawn(async move { store.adjust_available(&key, Decimal::NEGATIVE_ONE).await })
            })
            .collect();

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                applied += 1;
            }
        }

        assert_eq!(applied, 1);
        let stored = store.find_by_key("tools", p.id).await.unwrap().unwrap();
        assert_eq!(stored.available, Decimal::ZERO);
    }

    #[tokio::test]
    async fn change_feed_sees_product_writes_but_not_aggregates() {
        let store = MemoryStore::new();
        let mut feed = store.subscribe_changes();

        let p = store.create_product(&product("tools", 2)).await.unwrap();
        store.adjust_available(&p.key(), Decimal::ONE).await.unwrap();
        store
            .put_aggregate(&CategoryAggregate::new("tools", Decimal::from(3), vec![p.id], Utc::now()))
            .await
            .unwrap();
        store.delete_product(&p.key()).await.unwrap();

        let kinds: Vec<_> = [
            feed.recv().await.unwrap(),
            feed.recv().await.unwrap(),
            feed.recv().await.unwrap(),
        ]
        .into_iter()
        .map(|c| c.event_name)
        .collect();

        assert_eq!(kinds, vec![ChangeKind::Insert, ChangeKind::Modify, ChangeKind::Remove]);
        assert!(feed.try_recv().is_err());
    }

    #[tokio::test]
    async fn find_by_category_stays_in_partition() {
        let store = MemoryStore::new();
        store.create_product(&product("tools", 1)).await.unwrap();
        store.create_product(&product("tools", 2)).await.unwrap();
        store.create_product(&product("garden", 3)).await.unwrap();

        let tools = ProductQueryRepositoryTrait::find_by_category(&store, "tools")
            .await
            .unwrap();
        assert_eq!(tools.len(), 2);
        assert!(tools.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(ProductQueryRepositoryTrait::find_all(&store).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_order_returns_removed_image() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let order = OrderModel {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            category: "tools".into(),
            product_name: "Widget".into(),
            unit_price: Decimal::new(999, 2),
            quantity: 3,
            total: Decimal::new(2997, 2),
            created_at: now,
            updated_at: now,
        };

        store.create_order(&order).await.unwrap();
        assert_eq!(store.delete_order(order.id).await.unwrap(), order);
        assert!(matches!(
            store.delete_order(order.id).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
