mod database;
#[cfg(feature = "kafka")]
mod kafka;
mod jwt;
mod myconfig;

pub use self::database::{ConnectionManager, ConnectionPool};
pub use self::jwt::{Claims, JwtConfig};
#[cfg(feature = "kafka")]
pub use self::kafka::Kafka;
pub use self::myconfig::{Config, EventBusBackend, StoreBackend};
