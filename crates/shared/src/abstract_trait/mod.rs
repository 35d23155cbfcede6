mod category;
mod event_bus;
mod jwt;
mod order;
mod product;

pub use self::category::{
    CategoryQueryServiceTrait, CategoryRepositoryTrait, DynCategoryQueryService,
    DynCategoryRepository,
};
pub use self::event_bus::{DynEventBus, EventBusTrait};
pub use self::jwt::{DynJwtService, JwtServiceTrait};
pub use self::order::{
    DynOrderCommandRepository, DynOrderCommandService, DynOrderQueryRepository,
    DynOrderQueryService, OrderCommandRepositoryTrait, OrderCommandServiceTrait,
    OrderQueryRepositoryTrait, OrderQueryServiceTrait,
};
pub use self::product::{
    DynProductChangeFeed, DynProductCommandRepository, DynProductCommandService,
    DynProductQueryRepository, DynProductQueryService, ProductChangeFeedTrait,
    ProductCommandRepositoryTrait, ProductCommandServiceTrait, ProductQueryRepositoryTrait,
    ProductQueryServiceTrait,
};
