use anyhow::{Context, Result};
use apigateway::{handler::AppRouter, state::AppState};
use dotenv::dotenv;
use shared::{
    config::Config,
    utils::{init_logger, shutdown_signal},
};
use tokio::sync::broadcast;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let _log_guard = init_logger("apigateway", config.is_dev, config.enable_file_log);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let (state, workers) = AppState::new(&config, &shutdown_tx)
        .await
        .context("Failed to create AppState")?;

    let handles = workers.spawn(config.reconciler_batch_size, &shutdown_tx);

    info!(
        store = ?config.store_backend,
        event_bus = ?config.event_bus,
        "🚀 Server started successfully"
    );

    let signal_tx = shutdown_tx.clone();
    AppRouter::serve(config.port, state, async move {
        shutdown_signal().await;
        let _ = signal_tx.send(());
    })
    .await
    .context("Failed to start server")?;

    info!("Shutting down background workers...");
    let _ = shutdown_tx.send(());

    for handle in handles {
        if let Err(e) = handle.await {
            error!("Worker task failed: {e}");
        }
    }

    Ok(())
}
