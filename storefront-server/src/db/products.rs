//! Product and promotion database operations

use shared::models::product::{Product, Promotion};
use sqlx::PgPool;

use super::BoxError;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    business_id: i64,
    name: String,
    price: f64,
    partial_payment: Option<f64>,
    image_name: Option<String>,
    is_active: bool,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            business_id: r.business_id,
            name: r.name,
            price: r.price,
            partial_payment: r.partial_payment,
            image_name: r.image_name,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PromotionRow {
    id: i64,
    product_id: i64,
    discount: f64,
    start_date: i64,
    end_date: i64,
}

impl From<PromotionRow> for Promotion {
    fn from(r: PromotionRow) -> Self {
        Promotion {
            id: r.id,
            product_id: r.product_id,
            discount: r.discount,
            start_date: r.start_date,
            end_date: r.end_date,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, business_id, name, price, partial_payment, image_name, is_active";

/// Active products for a business (display order is not semantic)
pub async fn list_active(pool: &PgPool, business_id: i64) -> Result<Vec<Product>, BoxError> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!(
        r#"
        SELECT {PRODUCT_COLUMNS}
        FROM products
        WHERE business_id = $1 AND is_active
        ORDER BY name, id
        "#
    ))
    .bind(business_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Product>, BoxError> {
    let row: Option<ProductRow> =
        sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Into::into))
}

/// Promotions valid at `now` across a business's products
pub async fn active_promotions_for_business(
    pool: &PgPool,
    business_id: i64,
    now: i64,
) -> Result<Vec<Promotion>, BoxError> {
    let rows: Vec<PromotionRow> = sqlx::query_as(
        r#"
        SELECT pr.id, pr.product_id, pr.discount, pr.start_date, pr.end_date
        FROM promotions pr
        JOIN products p ON p.id = pr.product_id
        WHERE p.business_id = $1 AND pr.start_date <= $2 AND pr.end_date >= $2
        "#,
    )
    .bind(business_id)
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// The promotion valid at `now` for one product, if any. At most one is
/// assumed; ties resolve to the latest-ending window.
pub async fn active_promotion(
    pool: &PgPool,
    product_id: i64,
    now: i64,
) -> Result<Option<Promotion>, BoxError> {
    let row: Option<PromotionRow> = sqlx::query_as(
        r#"
        SELECT id, product_id, discount, start_date, end_date
        FROM promotions
        WHERE product_id = $1 AND start_date <= $2 AND end_date >= $2
        ORDER BY end_date DESC
        LIMIT 1
        "#,
    )
    .bind(product_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}
