mod category;
mod order;
mod product;

pub use self::category::{AGGREGATE_ID, CategoryAggregate};
pub use self::order::Order;
pub use self::product::{Product, ProductKey, ProductPatch};
