mod command;
mod query;

pub use self::command::{
    DynOrderCommandRepository, DynOrderCommandService, OrderCommandRepositoryTrait,
    OrderCommandServiceTrait,
};
pub use self::query::{
    DynOrderQueryRepository, DynOrderQueryService, OrderQueryRepositoryTrait,
    OrderQueryServiceTrait,
};
