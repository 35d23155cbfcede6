use crate::reconciler::StockReconciler;
use rdkafka::{Message, consumer::StreamConsumer};
use shared::domain::event::{DomainEvent, ORDER_CREATED, ORDER_DELETED, ORDER_UPDATED};
use std::sync::Arc;
use tokio::{
    sync::broadcast,
    time::{Duration, sleep},
};
use tracing::{debug, error, info, warn};

pub const ORDER_TOPICS: [&str; 3] = [ORDER_CREATED, ORDER_UPDATED, ORDER_DELETED];

/// Feeds order events from Kafka to the stock reconciler, one message per
/// batch. Messages are keyed by order id, so events of one order arrive in
/// publish order.
pub struct KafkaEventConsumer {
    consumer: StreamConsumer,
    reconciler: Arc<StockReconciler>,
}

impl KafkaEventConsumer {
    /// `consumer` must already be subscribed to [`ORDER_TOPICS`].
    pub fn new(consumer: StreamConsumer, reconciler: Arc<StockReconciler>) -> Self {
        Self {
            consumer,
            reconciler,
        }
    }

    pub async fn start_with_shutdown(self, mut shutdown: broadcast::Receiver<()>) {
        info!("✅ Kafka consumer started, subscribed to order events");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("🛑 Kafka consumer received shutdown signal");
                    break;
                }
                message_result = self.consumer.recv() => {
                    let message = match message_result {
                        Ok(message) => message,
                        Err(e) => {
                            error!("Kafka receive error: {e}");
                            sleep(Duration::from_secs(5)).await;
                            continue;
                        }
                    };

                    let topic = message.topic().to_string();
                    let key = message
                        .key()
                        .and_then(|k| std::str::from_utf8(k).ok())
                        .map(str::to_string);

                    let Some(payload) = message.payload() else {
                        error!(topic, "Empty message payload");
                        continue;
                    };
                    debug!(topic, key = ?key, payload_len = payload.len(), "Payload received");

                    let event: DomainEvent = match serde_json::from_slice(payload) {
                        Ok(event) => event,
                        Err(e) => {
                            error!(topic, key = ?key, "Failed to deserialize event: {e}");
                            continue;
                        }
                    };

                    if let (Some(key), Some(order_id)) = (&key, event.order_id())
                        && key != order_id
                    {
                        warn!(topic, key, order_id, "Key does not match event order id");
                    }

                    let report = self.reconciler.apply_batch(vec![event]).await;
                    if report.applied() == 1 {
                        info!(topic, key = ?key, "✅ Event processed successfully");
                    }
                }
            }
        }
    }
}
