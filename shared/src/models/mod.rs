//! Domain models shared between the storefront server and its clients

pub mod business;
pub mod cart;
pub mod customer;
pub mod order;
pub mod payment;
pub mod product;

pub use business::Business;
pub use cart::{CartItemView, CartView};
pub use customer::{Customer, CustomerCreate};
pub use order::{Order, OrderItem, OrderStatus, PaymentStatus};
pub use payment::{CallbackStatus, PaymentPhase};
pub use product::{CatalogEntry, Product, Promotion};
