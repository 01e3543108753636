//! Business Model

use serde::{Deserialize, Serialize};

/// Business (storefront owner) entity
///
/// Read-only from the storefront's perspective; businesses are created and
/// maintained by the back-office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: i64,
    pub business_name: String,
    /// Human-readable slug identifying the storefront (unique)
    pub company_alias: String,
    /// Logo object name under `business/{id}/` in the upload bucket
    pub logo_name: Option<String>,
    /// Payments go through the mobile-money gateway when set; cash otherwise
    pub has_wallet: bool,
    pub created_at: i64,
}
