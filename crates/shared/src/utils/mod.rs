mod gracefullshutdown;
mod logs;
mod metrics;
mod money;
mod tracing_context;

pub use self::gracefullshutdown::shutdown_signal;
pub use self::logs::init_logger;
pub use self::metrics::{Labels, Method, Metrics, Status};
pub use self::money::round_money;
pub use self::tracing_context::TracingContext;
