use crate::{
    abstract_trait::ProductChangeFeedTrait, config::ConnectionPool,
    domain::change::ProductChange, repository::TableNames,
};
use anyhow::{Context, Result};
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

const CHANGE_FEED_CAPACITY: usize = 1024;

/// Re-broadcasts the product table's `pg_notify` change records to
/// in-process subscribers.
pub struct PgChangeFeed {
    sender: broadcast::Sender<ProductChange>,
}

impl PgChangeFeed {
    pub async fn start(
        db: &ConnectionPool,
        tables: &TableNames,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<Self> {
        let channel = tables.changes_channel();
        let mut listener = PgListener::connect_with(db)
            .await
            .context("Failed to open change listener connection")?;
        listener
            .listen(&channel)
            .await
            .with_context(|| format!("Failed to LISTEN on {channel}"))?;

        let (sender, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let feed = sender.clone();

        tokio::spawn(async move {
            info!("👂 Listening for product changes on {channel}");
            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        info!("🛑 Product change listener stopped");
                        break;
                    }
                    notification = listener.recv() => match notification {
                        Ok(notification) => {
                            match serde_json::from_str::<ProductChange>(notification.payload()) {
                                Ok(change) => {
                                    let _ = feed.send(change);
                                }
                                Err(e) => warn!("⚠️ Dropping undecodable change record: {e}"),
                            }
                        }
                        Err(e) => {
                            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                            request_resync(&feed, &e);
                        }
                    }
                }
            }
        });

        Ok(Self { sender })
    }
}

/// The listener reconnects on its next `recv`, but anything notified while
/// it was down is gone. Subscribers get a resync marker instead.
fn request_resync(feed: &broadcast::Sender<ProductChange>, e: &sqlx::Error) {
    error!("❌ Change listener error, requesting resync: {e:?}");
    let _ = feed.send(ProductChange::resync());
}

impl ProductChangeFeedTrait for PgChangeFeed {
    fn subscribe_changes(&self) -> broadcast::Receiver<ProductChange> {
        self.sender.subscribe()
    }
}
