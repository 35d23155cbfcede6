use crate::{domain::event::DomainEvent, errors::ServiceError};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynEventBus = Arc<dyn EventBusTrait + Send + Sync>;

#[async_trait]
pub trait EventBusTrait {
    async fn publish(&self, event: &DomainEvent) -> Result<(), ServiceError>;
}
