//! Application state for the storefront server

use sqlx::PgPool;
use std::time::Duration;

use crate::cart::CartStore;
use crate::config::Config;
use crate::gateway::GatewayClient;
use crate::payment::{PollPolicy, WatcherRegistry};
use crate::storage::ObjectStorage;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// S3-backed object storage (attachments, catalog images, logos)
    pub storage: ObjectStorage,
    /// Payment gateway client
    pub gateway: GatewayClient,
    /// In-memory cart sessions
    pub carts: CartStore,
    /// Live payment reconciliation watchers
    pub watchers: WatcherRegistry,
    /// Payment polling policy (interval × budget)
    pub poll: PollPolicy,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let storage = ObjectStorage::new(&config.upload_bucket, config.presign_ttl_secs).await;

        Ok(Self {
            pool,
            storage,
            gateway: GatewayClient::new(&config.gateway_base_url),
            carts: CartStore::new(config.cart_ttl_secs),
            watchers: WatcherRegistry::new(),
            poll: PollPolicy {
                interval: Duration::from_millis(config.poll_interval_ms),
                max_attempts: config.poll_max_attempts,
            },
        })
    }
}
