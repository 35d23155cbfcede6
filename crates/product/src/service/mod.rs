mod category;
mod command;
mod query;

pub use self::category::CategoryQueryService;
pub use self::command::ProductCommandService;
pub use self::query::ProductQueryService;
