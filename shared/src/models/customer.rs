//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity
///
/// Scoped to a business: the same phone number may exist once per business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub location: Option<String>,
    pub gender: Option<String>,
    pub created_at: i64,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub business_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub location: Option<String>,
    pub gender: Option<String>,
}
