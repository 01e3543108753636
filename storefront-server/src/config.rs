//! Storefront server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Storefront server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Payment gateway base URL (getToken / initiatePayment / checkPayment)
    pub gateway_base_url: String,
    /// S3 bucket for order attachments and catalog images
    pub upload_bucket: String,
    /// Presigned GET URL lifetime in seconds
    pub presign_ttl_secs: u64,
    /// Payment status poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Payment status poll budget (attempts)
    pub poll_max_attempts: u32,
    /// Idle cart session lifetime in seconds
    pub cart_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            gateway_base_url: std::env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://paymentbackend.inxource.com/api/payment".into()),
            upload_bucket: std::env::var("UPLOAD_BUCKET")
                .unwrap_or_else(|_| "uploaded-files".into()),
            presign_ttl_secs: std::env::var("PRESIGN_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3600),
            poll_interval_ms: std::env::var("PAY_POLL_INTERVAL_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(2000),
            poll_max_attempts: std::env::var("PAY_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15),
            cart_ttl_secs: std::env::var("CART_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1800),
            environment,
        })
    }
}
