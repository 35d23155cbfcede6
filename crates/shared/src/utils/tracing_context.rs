use crate::utils::{Method, Metrics, Status};
use tokio::time::Instant;
use tracing::{error, info};

/// Times one service operation and reports it to the service's metrics.
pub struct TracingContext {
    pub operation: &'static str,
    pub start_time: Instant,
}

impl TracingContext {
    pub fn start(operation: &'static str) -> Self {
        info!("Starting operation: {operation}");
        Self {
            operation,
            start_time: Instant::now(),
        }
    }

    pub fn complete_success(&self, metrics: &Metrics, method: Method, message: &str) {
        self.complete(metrics, method, true, message);
    }

    pub fn complete_error(&self, metrics: &Metrics, method: Method, message: &str) {
        self.complete(metrics, method, false, message);
    }

    fn complete(&self, metrics: &Metrics, method: Method, is_success: bool, message: &str) {
        let elapsed = self.start_time.elapsed().as_secs_f64();

        let status = if is_success {
            info!(
                operation = self.operation,
                duration_secs = elapsed,
                "✅ Operation completed successfully: {message}"
            );
            Status::Success
        } else {
            error!(
                operation = self.operation,
                duration_secs = elapsed,
                "❌ Operation failed: {message}"
            );
            Status::Error
        };

        metrics.record(method, status, elapsed);
    }
}
