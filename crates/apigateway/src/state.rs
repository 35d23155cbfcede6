use crate::di::{DependenciesInject, StoreHandles};
use anyhow::Result;
use product::{aggregator::CategoryAggregator, reconciler::StockReconciler};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynEventBus, DynJwtService, ProductChangeFeedTrait},
    config::{Config, EventBusBackend, JwtConfig, StoreBackend},
    domain::{change::ProductChange, event::DomainEvent},
    events::{EventBus, MemoryEventBus},
    repository::MemoryStore,
};
use std::sync::Arc;
use tokio::{
    sync::{Mutex, broadcast, mpsc},
    task::JoinHandle,
};

#[derive(Clone)]
pub struct AppState {
    pub jwt_config: DynJwtService,
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
}

/// Where the stock reconciler reads order events from.
pub enum EventSource {
    Memory(mpsc::UnboundedReceiver<DomainEvent>),
    #[cfg(feature = "kafka")]
    Kafka(rdkafka::consumer::StreamConsumer),
}

/// Background consumers, built alongside the state and spawned by the
/// process entry point.
pub struct Workers {
    pub reconciler: Arc<StockReconciler>,
    pub aggregator: CategoryAggregator,
    pub events: EventSource,
    pub changes: broadcast::Receiver<ProductChange>,
}

impl Workers {
    pub fn spawn(self, batch_size: usize, shutdown: &broadcast::Sender<()>) -> Vec<JoinHandle<()>> {
        let aggregator = tokio::spawn(product::consumer::run_category_aggregator(
            self.aggregator,
            self.changes,
            batch_size,
            shutdown.subscribe(),
        ));

        let reconciler = match self.events {
            EventSource::Memory(events) => tokio::spawn(product::consumer::run_stock_reconciler(
                self.reconciler,
                events,
                batch_size,
                shutdown.subscribe(),
            )),
            #[cfg(feature = "kafka")]
            EventSource::Kafka(consumer) => tokio::spawn(
                product::consumer::KafkaEventConsumer::new(consumer, self.reconciler)
                    .start_with_shutdown(shutdown.subscribe()),
            ),
        };

        vec![aggregator, reconciler]
    }
}

impl AppState {
    pub async fn new(config: &Config, shutdown: &broadcast::Sender<()>) -> Result<(Self, Workers)> {
        let store = match config.store_backend {
            StoreBackend::Memory => StoreHandles::memory(Arc::new(MemoryStore::new())),
            StoreBackend::Postgres => StoreHandles::postgres(config, shutdown.subscribe()).await?,
        };

        let (bus, events) = match config.event_bus {
            EventBusBackend::Memory => memory_bus(),
            EventBusBackend::Kafka => kafka_bus(config)?,
        };

        Ok(Self::build(store, bus, events, &config.jwt_secret))
    }

    /// Everything in process: memory store and memory bus.
    pub fn in_memory(store: Arc<MemoryStore>, jwt_secret: &str) -> (Self, Workers) {
        let (bus, events) = memory_bus();
        Self::build(StoreHandles::memory(store), bus, events, jwt_secret)
    }

    fn build(
        store: StoreHandles,
        bus: DynEventBus,
        events: EventSource,
        jwt_secret: &str,
    ) -> (Self, Workers) {
        let mut registry = Registry::default();

        let di_container = DependenciesInject::new(&store, EventBus::new(bus), &mut registry);
        let reconciler = Arc::new(StockReconciler::new(
            store.product_command.clone(),
            &mut registry,
        ));
        let aggregator =
            CategoryAggregator::new(store.product_query.clone(), store.categories.clone());

        let workers = Workers {
            reconciler,
            aggregator,
            events,
            changes: store.changes.subscribe_changes(),
        };

        let state = Self {
            jwt_config: Arc::new(JwtConfig::new(jwt_secret)) as DynJwtService,
            di_container,
            registry: Arc::new(Mutex::new(registry)),
        };

        (state, workers)
    }
}

fn memory_bus() -> (DynEventBus, EventSource) {
    let (bus, events) = MemoryEventBus::new();
    (Arc::new(bus), EventSource::Memory(events))
}

#[cfg(feature = "kafka")]
fn kafka_bus(config: &Config) -> Result<(DynEventBus, EventSource)> {
    use anyhow::Context;
    use product::consumer::ORDER_TOPICS;
    use shared::config::Kafka;

    let brokers = config
        .kafka_broker
        .as_deref()
        .context("KAFKA is required for the kafka event bus")?;
    let kafka = Kafka::new(brokers).context("Failed to create Kafka producer")?;
    let consumer = kafka
        .consumer(&ORDER_TOPICS, "product-stock-reconciler")
        .context("Failed to create Kafka consumer")?;

    Ok((Arc::new(kafka), EventSource::Kafka(consumer)))
}

#[cfg(not(feature = "kafka"))]
fn kafka_bus(_config: &Config) -> Result<(DynEventBus, EventSource)> {
    anyhow::bail!("EVENT_BUS=kafka requires building with the `kafka` feature")
}
