pub mod aggregator;
pub mod consumer;
pub mod reconciler;
pub mod service;
