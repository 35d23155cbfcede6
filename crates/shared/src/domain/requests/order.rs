use super::validators::{validate_order_id, validate_product_id};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    #[serde(rename = "productId")]
    #[validate(custom(function = "validate_product_id"))]
    #[schema(example = "1b4e28ba-2fa1-11d2-883f-0016d3cca427")]
    pub product_id: String,

    #[validate(length(min = 1, max = 100, message = "Category must be between 1 and 100 characters"))]
    #[schema(example = "tools")]
    pub category: String,

    #[validate(range(min = 1, max = 1_000_000_000, message = "Quantity must be between 1 and 1000000000"))]
    #[schema(example = 3)]
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderRequest {
    #[validate(range(min = 1, max = 1_000_000_000, message = "Quantity must be between 1 and 1000000000"))]
    #[schema(example = 5)]
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct OrderKeyPath {
    #[validate(custom(function = "validate_order_id"))]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_order_field_rules() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "productId": "nope",
            "category": "tools",
            "quantity": 0,
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("productId") || fields.contains_key("product_id"));
        assert!(fields.contains_key("quantity"));
    }

    #[test]
    fn update_order_quantity_bounds() {
        assert!(UpdateOrderRequest { quantity: 1 }.validate().is_ok());
        assert!(UpdateOrderRequest { quantity: 0 }.validate().is_err());
        assert!(UpdateOrderRequest { quantity: 1_000_000_000 }.validate().is_ok());

        let errors = UpdateOrderRequest { quantity: 1_000_000_001 }
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
    }
}
