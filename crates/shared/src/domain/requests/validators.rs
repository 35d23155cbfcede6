use rust_decimal::Decimal;
use std::borrow::Cow;
use uuid::Uuid;
use validator::ValidationError;

/// 2^53, the largest integer a JSON number carries without loss.
const MAX_SAFE_NUMBER: i64 = 9_007_199_254_740_992;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn decimal_places(value: &Decimal) -> u32 {
    value.normalize().scale()
}

pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(invalid("positive", "Price must be a positive number"));
    }
    if decimal_places(price) > 2 {
        return Err(invalid("precision", "Price can have up to 2 decimal places"));
    }
    if *price > Decimal::from(MAX_SAFE_NUMBER) {
        return Err(invalid("max", "Price exceeds maximum allowed value"));
    }
    Ok(())
}

pub fn validate_available(available: &Decimal) -> Result<(), ValidationError> {
    if *available < Decimal::ZERO {
        return Err(invalid("min", "Available quantity cannot be negative"));
    }
    if decimal_places(available) > 3 {
        return Err(invalid(
            "precision",
            "Available quantity can have up to 3 decimal places",
        ));
    }
    if *available > Decimal::from(MAX_SAFE_NUMBER) {
        return Err(invalid("max", "Available quantity exceeds maximum allowed value"));
    }
    Ok(())
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(invalid("min", "must be greater than or equal to 0"));
    }
    Ok(())
}

pub fn validate_product_id(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| invalid("uuid", "Product ID must be a valid UUID"))
}

pub fn validate_order_id(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| invalid("uuid", "Order ID must be a valid UUID"))
}
