use crate::aggregator::CategoryAggregator;
use shared::domain::change::ProductChange;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::{error, info, warn};

/// Feeds product change notifications to the aggregator in batches of at
/// most `batch_size`. If the receiver lagged or the feed asked for a resync,
/// every category is recomputed instead.
pub async fn run_category_aggregator(
    aggregator: CategoryAggregator,
    mut changes: broadcast::Receiver<ProductChange>,
    batch_size: usize,
    mut shutdown: broadcast::Receiver<()>,
) {
    let batch_size = batch_size.max(1);

    info!("✅ Category aggregator started");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("🛑 Category aggregator received shutdown signal");
                break;
            }
            received = changes.recv() => {
                let mut lagged = false;
                let mut batch = Vec::with_capacity(batch_size);

                match received {
                    Ok(change) if change.is_resync() => {
                        warn!("⚠️ Change feed requested a resync");
                        lagged = true;
                    }
                    Ok(change) => batch.push(change),
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "⚠️ Change feed lagged");
                        lagged = true;
                    }
                    Err(RecvError::Closed) => {
                        info!("Change feed closed, stopping category aggregator");
                        break;
                    }
                }

                while !lagged && batch.len() < batch_size {
                    match changes.try_recv() {
                        Ok(change) if change.is_resync() => {
                            warn!("⚠️ Change feed requested a resync");
                            lagged = true;
                        }
                        Ok(change) => batch.push(change),
                        Err(TryRecvError::Lagged(missed)) => {
                            warn!(missed, "⚠️ Change feed lagged");
                            lagged = true;
                        }
                        Err(_) => break,
                    }
                }

                if lagged {
                    match aggregator.recompute_all().await {
                        Ok(report) => info!(
                            categories = report.outcomes.len(),
                            failed = report.failed(),
                            "📊 Full aggregate recompute finished"
                        ),
                        Err(e) => error!("❌ Full aggregate recompute failed: {e}"),
                    }
                } else {
                    let report = aggregator.reconcile(&batch).await;
                    info!(
                        changes = batch.len(),
                        categories = report.outcomes.len(),
                        failed = report.failed(),
                        "✅ Change batch processed"
                    );
                }
            }
        }
    }
}
