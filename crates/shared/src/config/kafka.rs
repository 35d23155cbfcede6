use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaResult;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use tracing::info;

use crate::abstract_trait::EventBusTrait;
use crate::domain::event::DomainEvent;
use crate::errors::ServiceError;

/// Kafka-backed event bus. Each detail type has its own topic and messages
/// are keyed by order id.
pub struct Kafka {
    producer: FutureProducer,
    brokers: String,
}

impl Kafka {
    pub fn new(brokers: &str) -> KafkaResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "6000")
            .set("allow.auto.create.topics", "true")
            .create()?;
        info!("Kafka producer connected successfully");
        Ok(Kafka {
            producer,
            brokers: brokers.to_string(),
        })
    }

    pub fn consumer(&self, topics: &[&str], group_id: &str) -> KafkaResult<StreamConsumer> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", group_id)
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "6000")
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .set("allow.auto.create.topics", "true")
            .create()?;

        consumer.subscribe(topics)?;
        Ok(consumer)
    }
}

#[async_trait]
impl EventBusTrait for Kafka {
    async fn publish(&self, event: &DomainEvent) -> Result<(), ServiceError> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| ServiceError::EventBus(format!("encode failed: {e}")))?;
        let key = event.order_id().unwrap_or_default().to_string();

        self.producer
            .send(
                FutureRecord::to(&event.detail_type).key(&key).payload(&payload),
                Duration::from_secs(5),
            )
            .await
            .map_err(|(e, _)| ServiceError::from(e))?;

        info!(topic = %event.detail_type, %key, "Message sent successfully");
        Ok(())
    }
}
