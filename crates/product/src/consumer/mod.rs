mod changes;
mod events;
#[cfg(feature = "kafka")]
mod kafka;

pub use self::changes::run_category_aggregator;
pub use self::events::run_stock_reconciler;
#[cfg(feature = "kafka")]
pub use self::kafka::{KafkaEventConsumer, ORDER_TOPICS};
