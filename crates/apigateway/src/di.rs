use anyhow::{Context, Result};
use order::service::{OrderCommandService, OrderCommandServiceDeps, OrderQueryService};
use product::service::{CategoryQueryService, ProductCommandService, ProductQueryService};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{
        DynCategoryQueryService, DynCategoryRepository, DynOrderCommandRepository,
        DynOrderCommandService, DynOrderQueryRepository, DynOrderQueryService,
        DynProductChangeFeed, DynProductCommandRepository, DynProductCommandService,
        DynProductQueryRepository, DynProductQueryService,
    },
    config::{Config, ConnectionManager},
    events::EventBus,
    repository::{
        CategoryRepository, MemoryStore, OrderCommandRepository, OrderQueryRepository,
        PgChangeFeed, ProductCommandRepository, ProductQueryRepository, ensure_schema,
    },
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Repository handles for one store backend.
#[derive(Clone)]
pub struct StoreHandles {
    pub product_query: DynProductQueryRepository,
    pub product_command: DynProductCommandRepository,
    pub order_query: DynOrderQueryRepository,
    pub order_command: DynOrderCommandRepository,
    pub categories: DynCategoryRepository,
    pub changes: DynProductChangeFeed,
}

impl StoreHandles {
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            product_query: store.clone(),
            product_command: store.clone(),
            order_query: store.clone(),
            order_command: store.clone(),
            categories: store.clone(),
            changes: store,
        }
    }

    pub async fn postgres(config: &Config, shutdown: broadcast::Receiver<()>) -> Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL is required for the postgres store")?;

        let db = ConnectionManager::new_pool(database_url, config.db_min_conn, config.db_max_conn)
            .await
            .context("Failed to connect to database")?;

        if config.run_migrations {
            ensure_schema(&db, &config.tables)
                .await
                .context("Failed to bootstrap schema")?;
            info!("✅ Schema is up to date");
        }

        let changes = PgChangeFeed::start(&db, &config.tables, shutdown)
            .await
            .context("Failed to start product change feed")?;

        Ok(Self {
            product_query: Arc::new(ProductQueryRepository::new(db.clone(), &config.tables)),
            product_command: Arc::new(ProductCommandRepository::new(db.clone(), &config.tables)),
            order_query: Arc::new(OrderQueryRepository::new(db.clone(), &config.tables)),
            order_command: Arc::new(OrderCommandRepository::new(db.clone(), &config.tables)),
            categories: Arc::new(CategoryRepository::new(db, &config.tables)),
            changes: Arc::new(changes),
        })
    }
}

#[derive(Clone)]
pub struct DependenciesInject {
    pub product_query: DynProductQueryService,
    pub product_command: DynProductCommandService,
    pub category_query: DynCategoryQueryService,
    pub order_query: DynOrderQueryService,
    pub order_command: DynOrderCommandService,
}

impl std::fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("product_query", &"DynProductQueryService")
            .field("product_command", &"DynProductCommandService")
            .field("category_query", &"DynCategoryQueryService")
            .field("order_query", &"DynOrderQueryService")
            .field("order_command", &"DynOrderCommandService")
            .finish()
    }
}

impl DependenciesInject {
    pub fn new(store: &StoreHandles, events: EventBus, registry: &mut Registry) -> Self {
        let product_query: DynProductQueryService = Arc::new(ProductQueryService::new(
            store.product_query.clone(),
            registry,
        ));

        let product_command: DynProductCommandService = Arc::new(ProductCommandService::new(
            store.product_query.clone(),
            store.product_command.clone(),
            registry,
        ));

        let category_query: DynCategoryQueryService = Arc::new(CategoryQueryService::new(
            store.categories.clone(),
            registry,
        ));

        let order_query: DynOrderQueryService =
            Arc::new(OrderQueryService::new(store.order_query.clone(), registry));

        let order_command: DynOrderCommandService = Arc::new(OrderCommandService::new(
            OrderCommandServiceDeps {
                product_query: store.product_query.clone(),
                query: store.order_query.clone(),
                command: store.order_command.clone(),
                events,
            },
            registry,
        ));

        Self {
            product_query,
            product_command,
            category_query,
            order_query,
            order_command,
        }
    }
}
