//! Payment status page endpoints
//!
//! The gateway redirects back to the storefront with
//! `?bb_invoice_id=&token=&status=`. A terminal `status` is trusted as-is;
//! otherwise the reconciliation watcher answers (or is started).

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::error::{AppError, ErrorCode};
use shared::models::payment::{CallbackStatus, PaymentPhase};
use shared::models::order::PaymentStatus;

use crate::db;
use crate::error::ServiceError;
use crate::payment::{self, CONFIRM_FAILED_MESSAGE};
use crate::state::AppState;

use super::checkout::PaymentInit;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// Provider invoice reference from the redirect (logged only)
    pub bb_invoice_id: Option<String>,
    /// Gateway token echo from the redirect
    pub token: Option<String>,
    /// Terminal status claim from the redirect: COMPLETE | FAILED | PENDING
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub order_token: String,
    pub phase: PaymentPhase,
}

/// GET /api/payment/status/{order_token}
pub async fn payment_status(
    State(state): State<AppState>,
    Path(order_token): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<PaymentStatusResponse>, ServiceError> {
    let callback = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<CallbackStatus>().ok());

    if query.bb_invoice_id.is_some() || query.token.is_some() {
        tracing::debug!(
            order_token = %order_token,
            invoice_id = ?query.bb_invoice_id,
            gateway_token = ?query.token,
            claimed_status = ?query.status,
            "Payment redirect callback"
        );
    }

    let phase = match callback {
        // The redirect carries an explicit terminal status: trust it rather
        // than re-querying the gateway.
        Some(CallbackStatus::Complete) => {
            let rows = db::orders::mark_completed(&state.pool, &order_token).await?;
            let phase = if rows > 0 {
                tracing::info!(order_token = %order_token, "Payment confirmed via redirect callback");
                PaymentPhase::Success
            } else if state.watchers.phase(&order_token) == Some(PaymentPhase::Success) {
                // Already confirmed (watcher or an earlier callback); a
                // repeat must not regress state
                PaymentPhase::Success
            } else {
                tracing::warn!(order_token = %order_token, "Callback completion matched no pending order");
                PaymentPhase::Failed {
                    reason: CONFIRM_FAILED_MESSAGE.to_string(),
                }
            };
            state.watchers.cancel(&order_token);
            state.watchers.publish(&order_token, phase.clone());
            phase
        }
        Some(CallbackStatus::Failed) => {
            let phase = PaymentPhase::Failed {
                reason: "Payment failed".to_string(),
            };
            state.watchers.cancel(&order_token);
            state.watchers.publish(&order_token, phase.clone());
            phase
        }
        // PENDING (or no claim): ask the watcher, starting one if needed
        Some(CallbackStatus::Pending) | None => match state.watchers.phase(&order_token) {
            Some(phase) if phase.is_terminal() => phase,
            _ => {
                // No-op when a watcher is already live; resumes polling when
                // a previous one was torn down mid-flight
                payment::spawn_watcher(&state, order_token.clone());
                state
                    .watchers
                    .phase(&order_token)
                    .unwrap_or(PaymentPhase::Loading)
            }
        },
    };

    Ok(Json(PaymentStatusResponse { order_token, phase }))
}

/// DELETE /api/payment/status/{order_token} — stop watching (the customer
/// left the status page); no further checks fire
pub async fn cancel_watch(
    State(state): State<AppState>,
    Path(order_token): Path<String>,
) -> Json<serde_json::Value> {
    state.watchers.cancel(&order_token);
    Json(serde_json::json!({ "cancelled": true }))
}

#[derive(Debug, Deserialize)]
pub struct RetryRequest {
    pub order_id: i64,
}

/// POST /api/payment/retry — re-invoke initiation for an unpaid order.
/// Issues a fresh gateway token and replaces any previous watcher.
pub async fn retry_payment(
    State(state): State<AppState>,
    Json(data): Json<RetryRequest>,
) -> Result<Json<PaymentInit>, ServiceError> {
    let order = db::orders::get(&state.pool, data.order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    if order.order_payment_status == PaymentStatus::Completed {
        return Err(AppError::new(ErrorCode::OrderAlreadyPaid).into());
    }

    let business = db::businesses::get(&state.pool, order.business_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BusinessNotFound))?;
    if !business.has_wallet {
        return Err(AppError::new(ErrorCode::WalletNotEnabled).into());
    }
    let customer = db::customers::get(&state.pool, order.customer_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;

    // The old token's watcher is moot once a fresh token is issued
    if let Some(old_token) = &order.order_token {
        state.watchers.cancel(old_token);
    }

    let amount = if order.partial_amount_total > 0.0 {
        order.partial_amount_total
    } else {
        order.total_amount
    };
    let description = format!("payment for {}", business.business_name);
    let token = state.gateway.get_token(&description, amount).await?;
    db::orders::set_token(&state.pool, order.id, &token).await?;

    let initiation = state
        .gateway
        .initiate_payment(&token, &customer.phone, order.id)
        .await
        .map_err(|e| {
            ServiceError::App(
                AppError::with_message(ErrorCode::PaymentInitFailed, e.message)
                    .with_detail("order_id", order.id),
            )
        })?;

    tracing::info!(order_id = order.id, "Payment initiation retried");
    payment::spawn_watcher(&state, token.clone());

    Ok(Json(PaymentInit {
        order_token: token,
        payment_link: initiation.payment_link,
        inline_status: initiation.payment_status.and_then(|s| s.status),
    }))
}
