use super::validators::{
    validate_available, validate_non_negative, validate_price, validate_product_id,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Product name must be between 1 and 255 characters"))]
    #[schema(example = "Widget")]
    pub name: String,

    #[validate(custom(function = "validate_price"))]
    #[schema(example = 9.99)]
    pub price: Decimal,

    #[validate(length(min = 1, max = 100, message = "Category must be between 1 and 100 characters"))]
    #[schema(example = "tools")]
    pub category: String,

    #[validate(custom(function = "validate_available"))]
    #[schema(example = 10)]
    pub available: Option<Decimal>,
}

/// Partial update. `category` is accepted so clients can send a full product
/// back, but it must match the path because it is part of the key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_update_has_field"))]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Product name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,

    #[validate(length(min = 1, max = 100, message = "Category must be between 1 and 100 characters"))]
    pub category: Option<String>,

    #[validate(custom(function = "validate_available"))]
    pub available: Option<Decimal>,
}

fn validate_update_has_field(req: &UpdateProductRequest) -> Result<(), ValidationError> {
    if req.name.is_none() && req.price.is_none() && req.available.is_none() {
        return Err(ValidationError::new("min_fields").with_message(Cow::Borrowed(
            "At least one field must be provided for update",
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ProductKeyPath {
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: String,

    #[validate(custom(function = "validate_product_id"))]
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AvailableStatus {
    InStock,
    OutOfStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindAllProducts {
    pub category: Option<String>,

    pub name: Option<String>,

    #[serde(rename = "minPrice")]
    #[validate(custom(function = "validate_non_negative"))]
    pub min_price: Option<Decimal>,

    #[serde(rename = "maxPrice")]
    #[validate(custom(function = "validate_non_negative"))]
    pub max_price: Option<Decimal>,

    #[serde(rename = "availableStatus")]
    pub available_status: Option<AvailableStatus>,

    #[serde(rename = "minAvailable")]
    #[validate(custom(function = "validate_non_negative"))]
    pub min_available: Option<Decimal>,

    #[serde(rename = "maxAvailable")]
    #[validate(custom(function = "validate_non_negative"))]
    pub max_available: Option<Decimal>,

    #[serde(rename = "sortOrder")]
    pub sort_order: Option<SortOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_rejects_bad_fields() {
        let req: CreateProductRequest = serde_json::from_value(json!({
            "name": "",
            "price": 0,
            "category": "tools",
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
        assert!(!fields.contains_key("category"));
    }

    #[test]
    fn create_rejects_unknown_fields() {
        let parsed = serde_json::from_value::<CreateProductRequest>(json!({
            "name": "Widget",
            "price": 9.99,
            "category": "tools",
            "color": "red",
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn update_needs_one_field() {
        assert!(UpdateProductRequest::default().validate().is_err());

        let only_category = UpdateProductRequest {
            category: Some("tools".into()),
            ..Default::default()
        };
        assert!(only_category.validate().is_err());

        let name = UpdateProductRequest {
            name: Some("Gadget".into()),
            ..Default::default()
        };
        assert!(name.validate().is_ok());
    }

    #[test]
    fn query_parses_camel_case() {
        let query: FindAllProducts = serde_json::from_value(json!({
            "availableStatus": "inStock",
            "sortOrder": "desc",
            "minPrice": 1.5,
        }))
        .unwrap();

        assert_eq!(query.available_status, Some(AvailableStatus::InStock));
        assert_eq!(query.sort_order, Some(SortOrder::Desc));
        assert_eq!(query.min_price, Some(Decimal::new(15, 1)));
        assert!(query.validate().is_ok());
    }
}
