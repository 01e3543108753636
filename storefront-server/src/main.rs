//! storefront-server — customer-facing checkout and payment service
//!
//! Long-running service that:
//! - Resolves storefront aliases and gates checkout on a phone number
//! - Serves the product catalog with active promotions and image URLs
//! - Holds in-memory cart sessions until checkout
//! - Writes orders (order + items in one transaction) with attachments
//! - Initiates mobile-money payments and reconciles their eventual status

mod api;
mod cart;
mod config;
mod db;
mod error;
mod gateway;
mod money;
mod payment;
mod state;
mod storage;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting storefront-server (env: {})", config.environment);

    // Initialize application state
    let state = AppState::new(&config).await?;

    let app = api::create_router(state.clone());

    // Periodic idle-cart sweep (every 5 minutes)
    let carts = state.carts.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            carts.sweep_idle();
        }
    });

    // Start HTTP server
    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("storefront-server HTTP listening on {http_addr}");

    axum::serve(http_listener, app).await?;

    // No further payment checks may fire once the server is going down
    state.watchers.cancel_all();

    Ok(())
}
