//! Checkout: turn a cart session into an order, initiating payment for
//! wallet-enabled businesses
//!
//! Write ordering: the gateway token is obtained first (wallet only, nothing
//! persisted yet), then the order and its items land in one transaction, and
//! only then are attachments uploaded — they are supplementary and must never
//! block order confirmation.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::error::{AppError, ErrorCode};
use shared::models::business::Business;
use shared::models::customer::Customer;
use shared::models::order::{Order, PaymentStatus};

use crate::cart::CartItem;
use crate::db;
use crate::db::orders::{NewOrder, NewOrderItem};
use crate::error::ServiceError;
use crate::money::{line_total, to_f64};
use crate::state::AppState;
use crate::storage::{order_attachment_key, order_item_attachment_key};
use rust_decimal::Decimal;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub cart_id: Uuid,
    pub customer_id: i64,
    /// Checkout-level notes, stored as the order's summarized notes
    pub summarized_notes: Option<String>,
    pub delivery_location: Option<String>,
}

/// Payment-initiation data for wallet checkouts
#[derive(Debug, Serialize)]
pub struct PaymentInit {
    /// Gateway transaction token, also stored on the order
    pub order_token: String,
    /// Redirect link when the gateway chose the redirect flow
    pub payment_link: Option<String>,
    /// Inline status when the gateway settled immediately
    pub inline_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    /// None for cash checkouts (settled at creation)
    pub payment: Option<PaymentInit>,
}

/// Assemble the order to insert from the cart snapshot.
///
/// Total is Σ(price × quantity) over the snapshots. Wallet-enabled businesses
/// get a partial amount total and a pending payment status; cash orders are
/// settled at creation.
pub(crate) fn build_new_order(
    business: &Business,
    customer: &Customer,
    cart_items: &[CartItem],
    summarized_notes: Option<String>,
    delivery_location: Option<String>,
) -> NewOrder {
    let total: Decimal = cart_items
        .iter()
        .map(|i| line_total(i.price, i.quantity))
        .sum();
    let partial: Decimal = cart_items
        .iter()
        .map(|i| line_total(i.partial_payment, i.quantity))
        .sum();

    NewOrder {
        business_id: business.id,
        customer_id: customer.id,
        total_amount: to_f64(total),
        partial_amount_total: if business.has_wallet {
            to_f64(partial)
        } else {
            0.0
        },
        delivery_location,
        summarized_notes,
        order_payment_status: if business.has_wallet {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Completed
        },
        order_token: None,
        items: cart_items
            .iter()
            .map(|i| NewOrderItem {
                product_id: i.product_id,
                quantity: i.quantity,
                price: i.price,
            })
            .collect(),
    }
}

/// POST /api/checkout
pub async fn checkout(
    State(state): State<AppState>,
    Json(data): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ServiceError> {
    // Snapshot the cart; the session is only consumed once the order exists
    let (business_id, cart_items) = state
        .carts
        .with_cart(data.cart_id, |cart| {
            (cart.business_id, cart.items().to_vec())
        })
        .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;

    if cart_items.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty).into());
    }

    let business = db::businesses::get(&state.pool, business_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BusinessNotFound))?;
    let customer = db::customers::get(&state.pool, data.customer_id)
        .await?
        .filter(|c| c.business_id == business.id)
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;

    let mut new_order = build_new_order(
        &business,
        &customer,
        &cart_items,
        data.summarized_notes,
        data.delivery_location,
    );

    // Wallet checkouts need a gateway token before anything is persisted
    if business.has_wallet {
        let amount = if new_order.partial_amount_total > 0.0 {
            new_order.partial_amount_total
        } else {
            new_order.total_amount
        };
        let description = format!("payment for {}", business.business_name);
        let token = state.gateway.get_token(&description, amount).await?;
        new_order.order_token = Some(token);
    }

    let order = db::orders::create(&state.pool, &new_order).await?;
    tracing::info!(
        order_id = order.id,
        business_id = business.id,
        customer_id = customer.id,
        total = order.total_amount,
        wallet = business.has_wallet,
        "Order created"
    );

    // The session is spent; attachments ride along from the taken cart
    if let Some(cart) = state.carts.take(data.cart_id) {
        if let Some(attachment) = &cart.attachment {
            let key = order_attachment_key(order.id, &attachment.file_name);
            state.storage.put_attachment_best_effort(&key, attachment).await;
        }
        for item in cart.items() {
            if let Some(attachment) = &item.attachment {
                let key =
                    order_item_attachment_key(order.id, item.product_id, &attachment.file_name);
                state.storage.put_attachment_best_effort(&key, attachment).await;
            }
        }
    }

    // Back-office notification, never fatal
    let summary_items: Vec<(String, i32)> = cart_items
        .iter()
        .map(|i| (i.name.clone(), i.quantity))
        .collect();
    let message = db::notifications::summarize_items(&summary_items, order.total_amount);
    if let Err(err) = db::notifications::create_for_order(&state.pool, &order, &message).await {
        tracing::warn!(order_id = order.id, error = %err, "Order notification failed, continuing");
    }

    // Initiate the mobile-money transaction for wallet checkouts
    let payment = match (&order.order_token, business.has_wallet) {
        (Some(token), true) => {
            let initiation = state
                .gateway
                .initiate_payment(token, &customer.phone, order.id)
                .await
                .map_err(|e| {
                    // The order exists; the client retries initiation against it
                    ServiceError::App(
                        AppError::with_message(ErrorCode::PaymentInitFailed, e.message)
                            .with_detail("order_id", order.id),
                    )
                })?;

            Some(PaymentInit {
                order_token: token.clone(),
                payment_link: initiation.payment_link,
                inline_status: initiation.payment_status.and_then(|s| s.status),
            })
        }
        _ => None,
    };

    Ok(Json(CheckoutResponse { order, payment }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business(has_wallet: bool) -> Business {
        Business {
            id: 1,
            business_name: "B1 Store".into(),
            company_alias: "b1".into(),
            logo_name: None,
            has_wallet,
            created_at: 0,
        }
    }

    fn customer() -> Customer {
        Customer {
            id: 9,
            business_id: 1,
            name: "Jane".into(),
            email: None,
            phone: "0977123456".into(),
            location: None,
            gender: None,
            created_at: 0,
        }
    }

    fn item(product_id: i64, price: f64, partial: f64, quantity: i32) -> CartItem {
        CartItem {
            product_id,
            name: format!("P{product_id}"),
            price,
            partial_payment: partial,
            quantity,
            description: None,
            special_instructions: None,
            attachment: None,
        }
    }

    #[test]
    fn test_build_wallet_order() {
        let items = vec![item(1, 100.0, 40.0, 2), item(2, 50.0, 0.0, 1)];
        let order = build_new_order(&business(true), &customer(), &items, None, None);

        assert_eq!(order.total_amount, 250.0);
        assert_eq!(order.partial_amount_total, 80.0);
        assert_eq!(order.order_payment_status, PaymentStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price, 100.0);
        assert_eq!(order.items[0].quantity, 2);
    }

    #[test]
    fn test_build_cash_order_settles_at_creation() {
        let items = vec![item(1, 100.0, 40.0, 2)];
        let order = build_new_order(&business(false), &customer(), &items, None, None);

        // Cash orders are considered settled; partial amounts do not apply
        assert_eq!(order.order_payment_status, PaymentStatus::Completed);
        assert_eq!(order.partial_amount_total, 0.0);
        assert_eq!(order.total_amount, 200.0);
    }

    #[test]
    fn test_build_order_carries_notes() {
        let items = vec![item(1, 10.0, 0.0, 1)];
        let order = build_new_order(
            &business(true),
            &customer(),
            &items,
            Some("ring the bell".into()),
            Some("5 Market Rd".into()),
        );

        assert_eq!(order.summarized_notes.as_deref(), Some("ring the bell"));
        assert_eq!(order.delivery_location.as_deref(), Some("5 Market Rd"));
    }

    #[test]
    fn test_price_snapshot_decoupled_from_product() {
        // The order item carries the cart's snapshot price, whatever the
        // live product price has become since
        let items = vec![item(7, 75.0, 0.0, 3)];
        let order = build_new_order(&business(true), &customer(), &items, None, None);
        assert_eq!(order.items[0].price, 75.0);
        assert_eq!(order.total_amount, 225.0);
    }
}
