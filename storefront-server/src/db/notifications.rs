//! Order notifications for the business back-office
//!
//! Written non-fatally after a successful checkout: a notification failure
//! never fails the order.

use shared::models::order::Order;
use shared::util::now_millis;
use sqlx::PgPool;
use sqlx::types::Json;

use super::BoxError;

/// Human-centric summary line for an order notification.
///
/// `items` are (product name, quantity) pairs in cart order.
pub fn summarize_items(items: &[(String, i32)], total: f64) -> String {
    match items.first() {
        None => format!("A new order has been placed. Total value: ZMW {total:.2}."),
        Some((name, quantity)) => {
            let mut summary = format!("{quantity}x {name}");
            let additional = items.len() - 1;
            if additional > 0 {
                summary.push_str(&format!(
                    " and {additional} other item{}",
                    if additional > 1 { "s" } else { "" }
                ));
            }
            format!("A new order has been placed for {summary}. Total value: ZMW {total:.2}.")
        }
    }
}

pub async fn create_for_order(
    pool: &PgPool,
    order: &Order,
    message: &str,
) -> Result<(), BoxError> {
    let metadata = serde_json::json!({
        "order_id": order.id,
        "total_amount": order.total_amount,
        "items": order.items.iter().map(|i| serde_json::json!({
            "product_id": i.product_id,
            "quantity": i.quantity,
            "price": i.price,
        })).collect::<Vec<_>>(),
    });

    sqlx::query(
        r#"
        INSERT INTO notifications (
            business_id, title, message, notification_type, priority, status,
            category, action_url, action_label, metadata, created_at
        )
        VALUES ($1, $2, $3, 'order', 'normal', 'unread', 'order', $4, $5, $6, $7)
        "#,
    )
    .bind(order.business_id)
    .bind("New Order Received")
    .bind(message)
    .bind(format!("/orders/{}", order.id))
    .bind("View Order Details")
    .bind(Json(metadata))
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}
