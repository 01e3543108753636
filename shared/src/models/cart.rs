//! Cart view models
//!
//! The cart itself lives in server memory; these are the shapes returned to
//! the storefront UI. Derived values (`item_count`, `total`) are recomputed on
//! every read, never cached.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One selected product in a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemView {
    pub product_id: i64,
    pub name: String,
    /// Unit price snapshot: promotion-adjusted at add time, never re-evaluated
    pub price: f64,
    /// Per-unit upfront amount (0 when the product has none)
    pub partial_payment: f64,
    pub quantity: i32,
    pub description: Option<String>,
    pub special_instructions: Option<String>,
    /// File name of the attached image, if one was uploaded
    pub attachment_name: Option<String>,
}

/// Cart session snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub cart_id: Uuid,
    pub business_id: i64,
    pub items: Vec<CartItemView>,
    /// Σ quantities
    pub item_count: i32,
    /// Σ (price × quantity)
    pub total: f64,
    /// File name of the checkout-level attachment, if any
    pub attachment_name: Option<String>,
}
