//! In-memory cart sessions
//!
//! Carts are single-session, server-held state keyed by a uuid. Nothing is
//! persisted until checkout; a successful checkout consumes the session.
//! Derived values (item count, total) are recomputed from the items on every
//! read.

use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use shared::models::cart::{CartItemView, CartView};
use shared::models::product::Product;
use shared::util::now_millis;

use crate::money::{line_total, to_f64};
use rust_decimal::Decimal;

/// An uploaded image held in memory until checkout moves it to object storage
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Partial update for an item's free-text extras; only provided fields change
#[derive(Debug, Default, Clone)]
pub struct ExtrasUpdate {
    pub description: Option<String>,
    pub special_instructions: Option<String>,
}

/// One selected product with its price snapshot
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    /// Promotion-adjusted unit price captured at add time. Not re-evaluated,
    /// even if the promotion expires before checkout.
    pub price: f64,
    /// Per-unit upfront amount (0 when the product has none)
    pub partial_payment: f64,
    pub quantity: i32,
    pub description: Option<String>,
    pub special_instructions: Option<String>,
    pub attachment: Option<Attachment>,
}

/// Cart session contents
#[derive(Debug)]
pub struct Cart {
    pub business_id: i64,
    items: Vec<CartItem>,
    pub attachment: Option<Attachment>,
    last_touched: i64,
}

impl Cart {
    fn new(business_id: i64) -> Self {
        Self {
            business_id,
            items: Vec::new(),
            attachment: None,
            last_touched: now_millis(),
        }
    }

    /// Add a product: an existing entry gains quantity 1, a new entry starts
    /// at quantity 1 with `unit_price` as its snapshot.
    pub fn add_item(&mut self, product: &Product, unit_price: f64) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            item.quantity += 1;
            return;
        }
        self.items.push(CartItem {
            product_id: product.id,
            name: product.name.clone(),
            price: unit_price,
            partial_payment: product.partial_payment.unwrap_or(0.0),
            quantity: 1,
            description: None,
            special_instructions: None,
            attachment: None,
        });
    }

    /// Set an item's quantity; anything below 1 removes the item entirely.
    /// Returns false when the item is not in the cart.
    pub fn update_quantity(&mut self, product_id: i64, quantity: i32) -> bool {
        if quantity < 1 {
            return self.remove_item(product_id);
        }
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove an item. Returns false when it was not present.
    pub fn remove_item(&mut self, product_id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    /// Partial update of an item's extras; only provided fields change.
    pub fn update_extras(&mut self, product_id: i64, update: ExtrasUpdate) -> bool {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                if let Some(description) = update.description {
                    item.description = Some(description);
                }
                if let Some(instructions) = update.special_instructions {
                    item.special_instructions = Some(instructions);
                }
                true
            }
            None => false,
        }
    }

    /// Attach an image to an item, replacing any previous one.
    pub fn set_item_attachment(&mut self, product_id: i64, attachment: Attachment) -> bool {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.attachment = Some(attachment);
                true
            }
            None => false,
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Σ quantities
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Σ (price × quantity)
    pub fn total(&self) -> f64 {
        let sum: Decimal = self
            .items
            .iter()
            .map(|i| line_total(i.price, i.quantity))
            .sum();
        to_f64(sum)
    }

    /// Snapshot for the UI
    pub fn view(&self, cart_id: Uuid) -> CartView {
        CartView {
            cart_id,
            business_id: self.business_id,
            items: self
                .items
                .iter()
                .map(|i| CartItemView {
                    product_id: i.product_id,
                    name: i.name.clone(),
                    price: i.price,
                    partial_payment: i.partial_payment,
                    quantity: i.quantity,
                    description: i.description.clone(),
                    special_instructions: i.special_instructions.clone(),
                    attachment_name: i.attachment.as_ref().map(|a| a.file_name.clone()),
                })
                .collect(),
            item_count: self.item_count(),
            total: self.total(),
            attachment_name: self.attachment.as_ref().map(|a| a.file_name.clone()),
        }
    }
}

/// Cart session store
///
/// Cloneable handle over shared state; idle sessions are swept by a periodic
/// background task.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<DashMap<Uuid, Cart>>,
    ttl_ms: i64,
}

impl CartStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl_ms: (ttl_secs as i64) * 1000,
        }
    }

    /// Open a new cart session for a business
    pub fn create(&self, business_id: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.insert(id, Cart::new(business_id));
        id
    }

    /// Run a closure against a cart, refreshing its idle timer.
    /// Returns None for an unknown (or swept) session.
    pub fn with_cart<R>(&self, cart_id: Uuid, f: impl FnOnce(&mut Cart) -> R) -> Option<R> {
        let mut entry = self.inner.get_mut(&cart_id)?;
        entry.last_touched = now_millis();
        Some(f(&mut entry))
    }

    /// Consume a cart session (successful checkout)
    pub fn take(&self, cart_id: Uuid) -> Option<Cart> {
        self.inner.remove(&cart_id).map(|(_, cart)| cart)
    }

    /// Remove sessions idle for longer than the TTL
    pub fn sweep_idle(&self) {
        let cutoff = now_millis() - self.ttl_ms;
        self.inner.retain(|_, cart| cart.last_touched >= cutoff);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price: f64, partial: Option<f64>) -> Product {
        Product {
            id,
            business_id: 1,
            name: format!("Product {id}"),
            price,
            partial_payment: partial,
            image_name: None,
            is_active: true,
        }
    }

    #[test]
    fn test_add_item_increments_existing() {
        let mut cart = Cart::new(1);
        let p = product(10, 100.0, None);
        cart.add_item(&p, 100.0);
        cart.add_item(&p, 100.0);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_item_snapshots_price() {
        let mut cart = Cart::new(1);
        let p = product(10, 100.0, None);
        // Promotion-adjusted price at add time
        cart.add_item(&p, 75.0);
        // Further adds keep the original snapshot (only quantity moves)
        cart.add_item(&p, 75.0);

        assert_eq!(cart.items()[0].price, 75.0);
        assert_eq!(cart.total(), 150.0);
    }

    #[test]
    fn test_total_recomputed_over_mutations() {
        let mut cart = Cart::new(1);
        cart.add_item(&product(1, 100.0, None), 100.0);
        cart.add_item(&product(2, 50.0, None), 50.0);
        cart.update_quantity(1, 2);
        assert_eq!(cart.total(), 250.0);
        assert_eq!(cart.item_count(), 3);

        cart.remove_item(2);
        assert_eq!(cart.total(), 200.0);

        cart.update_quantity(1, 5);
        assert_eq!(cart.total(), 500.0);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new(1);
        cart.add_item(&product(1, 10.0, None), 10.0);

        assert!(cart.update_quantity(1, 0));
        assert!(cart.items().is_empty());

        cart.add_item(&product(1, 10.0, None), 10.0);
        assert!(cart.update_quantity(1, -3));
        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_update_quantity_missing_item() {
        let mut cart = Cart::new(1);
        assert!(!cart.update_quantity(42, 3));
    }

    #[test]
    fn test_update_extras_partial() {
        let mut cart = Cart::new(1);
        cart.add_item(&product(1, 10.0, None), 10.0);
        cart.update_extras(
            1,
            ExtrasUpdate {
                description: Some("blue variant".into()),
                special_instructions: Some("gift wrap".into()),
            },
        );

        // Only the provided field changes
        cart.update_extras(
            1,
            ExtrasUpdate {
                description: Some("red variant".into()),
                special_instructions: None,
            },
        );

        let item = &cart.items()[0];
        assert_eq!(item.description.as_deref(), Some("red variant"));
        assert_eq!(item.special_instructions.as_deref(), Some("gift wrap"));
    }

    #[test]
    fn test_partial_payment_defaults_to_zero() {
        let mut cart = Cart::new(1);
        cart.add_item(&product(1, 100.0, Some(40.0)), 100.0);
        cart.add_item(&product(2, 50.0, None), 50.0);

        assert_eq!(cart.items()[0].partial_payment, 40.0);
        assert_eq!(cart.items()[1].partial_payment, 0.0);
    }

    #[test]
    fn test_store_create_take() {
        let store = CartStore::new(60);
        let id = store.create(7);

        let business_id = store.with_cart(id, |c| c.business_id);
        assert_eq!(business_id, Some(7));

        let cart = store.take(id);
        assert!(cart.is_some());
        assert!(store.with_cart(id, |_| ()).is_none());
    }

    #[test]
    fn test_store_sweep_idle() {
        let store = CartStore::new(0); // everything is immediately idle
        let id = store.create(1);
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.sweep_idle();
        assert_eq!(store.len(), 0);
        assert!(store.with_cart(id, |_| ()).is_none());
    }
}
