mod command;
mod query;

pub use self::command::{
    DynProductChangeFeed, DynProductCommandRepository, DynProductCommandService,
    ProductChangeFeedTrait, ProductCommandRepositoryTrait, ProductCommandServiceTrait,
};
pub use self::query::{
    DynProductQueryRepository, DynProductQueryService, ProductQueryRepositoryTrait,
    ProductQueryServiceTrait,
};
