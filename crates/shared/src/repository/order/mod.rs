mod command;
mod query;

pub use self::command::OrderCommandRepository;
pub use self::query::OrderQueryRepository;

const ORDER_COLUMNS: &str =
    "id, product_id, category, product_name, unit_price, quantity, total, created_at, updated_at";
