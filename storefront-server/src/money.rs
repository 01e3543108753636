//! Money calculation utilities using rust_decimal for precision
//!
//! All cart/order arithmetic is done with `Decimal` internally, then converted
//! to `f64` for storage/serialization.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for precise calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Line total for one cart/order item: price × quantity
#[inline]
pub fn line_total(price: f64, quantity: i32) -> Decimal {
    to_decimal(price) * Decimal::from(quantity)
}

/// Apply a percentage promotion to a unit price: `price * (1 - discount/100)`
///
/// Discounts never compound; the caller passes at most one active promotion.
pub fn discounted_price(price: f64, discount_percent: f64) -> f64 {
    let factor = Decimal::ONE - to_decimal(discount_percent) / Decimal::from(100);
    to_f64(to_decimal(price) * factor)
}
