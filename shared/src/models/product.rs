//! Product and promotion models

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    /// Unit price before any promotion
    pub price: f64,
    /// Reduced upfront amount for wallet-enabled checkouts (per unit)
    pub partial_payment: Option<f64>,
    /// Image object name under `products/{id}/` in the upload bucket
    pub image_name: Option<String>,
    pub is_active: bool,
}

/// Time-bounded percentage discount on a product
///
/// At most one promotion is assumed active per product at any instant;
/// discounts never compound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: i64,
    pub product_id: i64,
    /// Discount percentage in [0, 100]
    pub discount: f64,
    /// Validity window, milliseconds since epoch (inclusive)
    pub start_date: i64,
    pub end_date: i64,
}

impl Promotion {
    /// A promotion applies only while `now` falls within its validity window.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}

/// Catalog listing entry: a product with its active promotion resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub product: Product,
    /// Active promotion at listing time, if any
    pub promotion: Option<Promotion>,
    /// Promotion-adjusted unit price (equals `price` without a promotion)
    pub final_price: f64,
    /// Resolved image URL; None when the product has no stored image
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promo(start: i64, end: i64) -> Promotion {
        Promotion {
            id: 1,
            product_id: 10,
            discount: 25.0,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_promotion_active_inside_window() {
        let p = promo(1_000, 2_000);
        assert!(p.is_active_at(1_000));
        assert!(p.is_active_at(1_500));
        assert!(p.is_active_at(2_000));
    }

    #[test]
    fn test_promotion_inactive_outside_window() {
        let p = promo(1_000, 2_000);
        assert!(!p.is_active_at(999));
        assert!(!p.is_active_at(2_001));
    }

    #[test]
    fn test_expired_promotion_never_active() {
        // end_date in the past relative to any later now
        let p = promo(0, 1_000);
        for now in [1_001, 5_000, i64::MAX] {
            assert!(!p.is_active_at(now));
        }
    }
}
