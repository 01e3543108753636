//! API routes for the storefront server

pub mod business;
pub mod carts;
pub mod checkout;
pub mod customers;
pub mod health;
pub mod payment;
pub mod products;

use axum::Router;
use axum::routing::{get, patch, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the storefront router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Storefront resolution and catalog
        .route("/api/business/{alias}", get(business::resolve_business))
        .route(
            "/api/business/{business_id}/products",
            get(products::list_products),
        )
        // Customer gate
        .route("/api/customers/lookup", get(customers::lookup_customer))
        .route("/api/customers", post(customers::create_customer))
        // Cart sessions
        .route("/api/carts", post(carts::create_cart))
        .route("/api/carts/{cart_id}", get(carts::get_cart))
        .route("/api/carts/{cart_id}/items", post(carts::add_item))
        .route(
            "/api/carts/{cart_id}/items/{product_id}",
            put(carts::update_quantity).delete(carts::remove_item),
        )
        .route(
            "/api/carts/{cart_id}/items/{product_id}/extras",
            patch(carts::update_extras),
        )
        .route(
            "/api/carts/{cart_id}/items/{product_id}/attachment",
            put(carts::upload_item_attachment),
        )
        .route(
            "/api/carts/{cart_id}/attachment",
            put(carts::upload_cart_attachment),
        )
        // Checkout and payment reconciliation
        .route("/api/checkout", post(checkout::checkout))
        .route(
            "/api/payment/status/{order_token}",
            get(payment::payment_status).delete(payment::cancel_watch),
        )
        .route("/api/payment/retry", post(payment::retry_payment));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        // Browser storefronts call from their own origins
        .layer(CorsLayer::permissive())
        .with_state(state)
}
