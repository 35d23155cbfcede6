mod command;
mod listener;
mod query;

pub use self::command::ProductCommandRepository;
pub use self::listener::PgChangeFeed;
pub use self::query::ProductQueryRepository;

const PRODUCT_COLUMNS: &str = "category, id, name, price, available, created_at, updated_at";
