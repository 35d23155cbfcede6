use crate::abstract_trait::EventBusTrait;
use crate::domain::event::DomainEvent;
use crate::errors::ServiceError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// In-process bus. Every published event is queued for the single receiver
/// returned by [`MemoryEventBus::new`], normally the stock reconciler.
#[derive(Clone)]
pub struct MemoryEventBus {
    sender: mpsc::UnboundedSender<DomainEvent>,
}

impl MemoryEventBus {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DomainEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventBusTrait for MemoryEventBus {
    async fn publish(&self, event: &DomainEvent) -> Result<(), ServiceError> {
        self.sender
            .send(event.clone())
            .map_err(|_| ServiceError::EventBus("event bus receiver closed".into()))
    }
}
