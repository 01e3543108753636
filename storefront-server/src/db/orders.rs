//! Order database operations
//!
//! The order row and its items are written in one transaction: an item
//! failure rolls the whole order back, so no orphan order rows are possible
//! on this path.

use shared::models::order::{Order, OrderItem, OrderStatus, PaymentStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::PgPool;

use super::BoxError;

/// Order assembled by checkout, ready to insert
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub business_id: i64,
    pub customer_id: i64,
    pub total_amount: f64,
    pub partial_amount_total: f64,
    pub delivery_location: Option<String>,
    pub summarized_notes: Option<String>,
    pub order_payment_status: PaymentStatus,
    /// Gateway token obtained before insert for wallet checkouts
    pub order_token: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// One order line with its price snapshot
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    business_id: i64,
    customer_id: i64,
    total_amount: f64,
    partial_amount_total: f64,
    delivery_location: Option<String>,
    summarized_notes: Option<String>,
    order_status: String,
    order_payment_status: String,
    order_token: Option<String>,
    created_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i64,
    product_id: i64,
    quantity: i32,
    price: f64,
}

fn order_status_from(s: &str) -> OrderStatus {
    match s {
        "completed" => OrderStatus::Completed,
        "cancelled" => OrderStatus::Cancelled,
        _ => OrderStatus::Pending,
    }
}

fn payment_status_from(s: &str) -> PaymentStatus {
    match s {
        "completed" => PaymentStatus::Completed,
        _ => PaymentStatus::Pending,
    }
}

fn order_from(row: OrderRow, items: Vec<OrderItem>) -> Order {
    Order {
        id: row.id,
        business_id: row.business_id,
        customer_id: row.customer_id,
        total_amount: row.total_amount,
        partial_amount_total: row.partial_amount_total,
        delivery_location: row.delivery_location,
        summarized_notes: row.summarized_notes,
        order_status: order_status_from(&row.order_status),
        order_payment_status: payment_status_from(&row.order_payment_status),
        order_token: row.order_token,
        created_at: row.created_at,
        items,
    }
}

const ORDER_COLUMNS: &str = "id, business_id, customer_id, total_amount, partial_amount_total, \
     delivery_location, summarized_notes, order_status, order_payment_status, order_token, \
     created_at";

/// Insert one order row plus its items atomically. Returns the created order
/// with its server-assigned id.
pub async fn create(pool: &PgPool, new: &NewOrder) -> Result<Order, BoxError> {
    let id = snowflake_id();
    let now = now_millis();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, business_id, customer_id, total_amount, partial_amount_total,
            delivery_location, summarized_notes, order_status,
            order_payment_status, order_token, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(id)
    .bind(new.business_id)
    .bind(new.customer_id)
    .bind(new.total_amount)
    .bind(new.partial_amount_total)
    .bind(&new.delivery_location)
    .bind(&new.summarized_notes)
    .bind(OrderStatus::Pending.as_str())
    .bind(new.order_payment_status.as_str())
    .bind(&new.order_token)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    if !new.items.is_empty() {
        let order_ids: Vec<i64> = new.items.iter().map(|_| id).collect();
        let product_ids: Vec<i64> = new.items.iter().map(|i| i.product_id).collect();
        let quantities: Vec<i32> = new.items.iter().map(|i| i.quantity).collect();
        let prices: Vec<f64> = new.items.iter().map(|i| i.price).collect();
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::integer[], $4::double precision[])
            "#,
        )
        .bind(&order_ids)
        .bind(&product_ids)
        .bind(&quantities)
        .bind(&prices)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let items = new
        .items
        .iter()
        .map(|i| OrderItem {
            order_id: id,
            product_id: i.product_id,
            quantity: i.quantity,
            price: i.price,
        })
        .collect();

    Ok(Order {
        id,
        business_id: new.business_id,
        customer_id: new.customer_id,
        total_amount: new.total_amount,
        partial_amount_total: new.partial_amount_total,
        delivery_location: new.delivery_location.clone(),
        summarized_notes: new.summarized_notes.clone(),
        order_status: OrderStatus::Pending,
        order_payment_status: new.order_payment_status,
        order_token: new.order_token.clone(),
        created_at: now,
        items,
    })
}

/// Store a freshly issued gateway token on an order (payment retry)
pub async fn set_token(pool: &PgPool, order_id: i64, token: &str) -> Result<(), BoxError> {
    let result = sqlx::query("UPDATE orders SET order_token = $1 WHERE id = $2")
        .bind(token)
        .bind(order_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err("Order not found".into());
    }
    Ok(())
}

/// Mark the order carrying this gateway token as paid, exactly once.
///
/// Matches on the token (the gateway never returns our order id) and only
/// flips pending → completed. Returns the affected row count: 0 means token
/// mismatch or already processed — detectable, and never touching other rows.
pub async fn mark_completed(pool: &PgPool, order_token: &str) -> Result<u64, BoxError> {
    let result = sqlx::query(
        r#"
        UPDATE orders
        SET order_payment_status = 'completed'
        WHERE order_token = $1 AND order_payment_status = 'pending'
        "#,
    )
    .bind(order_token)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Order>, BoxError> {
    let row: Option<OrderRow> =
        sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items: Vec<OrderItemRow> = sqlx::query_as(
        "SELECT order_id, product_id, quantity, price FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let items = items
        .into_iter()
        .map(|i| OrderItem {
            order_id: i.order_id,
            product_id: i.product_id,
            quantity: i.quantity,
            price: i.price,
        })
        .collect();

    Ok(Some(order_from(row, items)))
}
