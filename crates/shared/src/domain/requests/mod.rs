mod order;
mod product;
mod validators;

pub use self::order::{CreateOrderRequest, OrderKeyPath, UpdateOrderRequest};
pub use self::product::{
    AvailableStatus, CreateProductRequest, FindAllProducts, ProductKeyPath, SortOrder,
    UpdateProductRequest,
};
