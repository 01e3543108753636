//! Database access layer

pub mod businesses;
pub mod customers;
pub mod notifications;
pub mod orders;
pub mod products;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
