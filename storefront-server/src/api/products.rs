//! Product catalog listing

use axum::{
    Json,
    extract::{Path, State},
};
use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::product::{CatalogEntry, Promotion};
use shared::util::now_millis;

use crate::db;
use crate::error::ServiceError;
use crate::money::discounted_price;
use crate::state::AppState;
use crate::storage::product_image_key;

/// GET /api/business/{business_id}/products
///
/// Each entry carries the active promotion (if any), the promotion-adjusted
/// price, and a resolved image URL.
pub async fn list_products(
    State(state): State<AppState>,
    Path(business_id): Path<i64>,
) -> Result<Json<Vec<CatalogEntry>>, ServiceError> {
    if db::businesses::get(&state.pool, business_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::BusinessNotFound).into());
    }

    let now = now_millis();
    let products = db::products::list_active(&state.pool, business_id).await?;
    let promotions =
        db::products::active_promotions_for_business(&state.pool, business_id, now).await?;

    let mut promo_map: HashMap<i64, Promotion> = promotions
        .into_iter()
        .map(|p| (p.product_id, p))
        .collect();

    let mut entries = Vec::with_capacity(products.len());
    for product in products {
        let image_url = match &product.image_name {
            Some(name) => state
                .storage
                .public_url(&product_image_key(product.id, name))
                .await?,
            None => None,
        };

        let promotion = promo_map.remove(&product.id);
        let final_price = match &promotion {
            Some(promo) => discounted_price(product.price, promo.discount),
            None => product.price,
        };

        entries.push(CatalogEntry {
            product,
            promotion,
            final_price,
            image_url,
        });
    }

    Ok(Json(entries))
}
