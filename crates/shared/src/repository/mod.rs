mod category;
mod memory;
mod order;
mod product;
mod schema;

pub use self::category::CategoryRepository;
pub use self::memory::MemoryStore;
pub use self::order::{OrderCommandRepository, OrderQueryRepository};
pub use self::product::{PgChangeFeed, ProductCommandRepository, ProductQueryRepository};
pub use self::schema::{TableNames, ensure_schema};
