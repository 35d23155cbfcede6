use crate::reconciler::StockReconciler;
use shared::domain::event::DomainEvent;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

/// Drains the in-process event bus in batches of at most `batch_size`.
/// Waits for the first event of each batch, then takes whatever is already
/// queued. Returns when the bus closes or shutdown fires.
pub async fn run_stock_reconciler(
    reconciler: Arc<StockReconciler>,
    mut events: mpsc::UnboundedReceiver<DomainEvent>,
    batch_size: usize,
    mut shutdown: broadcast::Receiver<()>,
) {
    let batch_size = batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);

    info!("✅ Stock reconciler started");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("🛑 Stock reconciler received shutdown signal");
                break;
            }
            received = events.recv_many(&mut batch, batch_size) => {
                if received == 0 {
                    info!("Event bus closed, stopping stock reconciler");
                    break;
                }

                let report = reconciler.apply_batch(std::mem::take(&mut batch)).await;
                info!(
                    applied = report.applied(),
                    skipped = report.skipped(),
                    "✅ Event batch processed"
                );
            }
        }
    }
}
