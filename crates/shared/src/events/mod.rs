mod memory;

pub use self::memory::MemoryEventBus;

use crate::abstract_trait::DynEventBus;
use crate::domain::event::{DomainEvent, OrderEvent};
use crate::errors::ServiceError;
use tracing::{error, info};

/// Publishes typed order events through whichever bus backend is wired in.
#[derive(Clone)]
pub struct EventBus {
    bus: DynEventBus,
}

impl EventBus {
    pub fn new(bus: DynEventBus) -> Self {
        Self { bus }
    }

    pub async fn publish(&self, event: &OrderEvent) -> Result<DomainEvent, ServiceError> {
        let envelope = event
            .to_envelope()
            .map_err(|e| ServiceError::Internal(format!("Event encoding failed: {e}")))?;

        self.bus.publish(&envelope).await.map_err(|e| {
            error!(
                order_id = %event.order_id(),
                detail_type = event.detail_type(),
                "❌ Failed to publish event: {e}"
            );
            e
        })?;

        info!(
            order_id = %event.order_id(),
            detail_type = event.detail_type(),
            "📤 Event published"
        );

        Ok(envelope)
    }
}
