//! Client-side cart store.
//!
//! The cart lives in memory and is shared by handle: every clone of a
//! [`CartStore`] sees every mutation as soon as the mutating call returns.
//! Lines are kept in insertion order and keyed by `(product_id, variant_id)`.
//!
//! The badge shows [`CartStore::count`], the number of distinct lines, not
//! the summed quantity. Shoppers are used to that number, so keep it.

use std::sync::{Arc, PoisonError, RwLock};

use navdana_core::{CartLine, Price, ProductId, VariantId};
use tokio::sync::watch;

use crate::error::add_breadcrumb;
use crate::session::{KeyValueStorage, StorageError, keys};

/// Shared, synchronously observable cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    lines: RwLock<Vec<CartLine>>,
    count_tx: watch::Sender<usize>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines())
            .finish()
    }
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lines(Vec::new())
    }

    fn with_lines(lines: Vec<CartLine>) -> Self {
        let (count_tx, _) = watch::channel(lines.len());
        Self {
            inner: Arc::new(CartInner {
                lines: RwLock::new(lines),
                count_tx,
            }),
        }
    }

    /// Add units of a product variant.
    ///
    /// Increments the existing line for `(product_id, variant_id)` if there
    /// is one, otherwise appends a new line. A quantity of zero adds one
    /// unit. The existing line keeps its original size and price snapshot.
    pub fn add(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
        size: impl Into<String>,
        quantity: u32,
        price_snapshot: Price,
    ) {
        let quantity = quantity.max(1);
        add_breadcrumb(
            "cart",
            "Added to cart",
            &[("product_id", product_id.as_str()), ("variant_id", variant_id.as_str())],
        );
        self.mutate(|lines| {
            if let Some(line) = lines
                .iter_mut()
                .find(|l| l.matches(&product_id, &variant_id))
            {
                line.quantity = line.quantity.saturating_add(quantity);
            } else {
                lines.push(CartLine {
                    product_id,
                    variant_id,
                    size: size.into(),
                    quantity,
                    price_snapshot,
                });
            }
        });
    }

    /// Remove the line for a product variant. Missing lines are ignored.
    pub fn remove(&self, product_id: &ProductId, variant_id: &VariantId) {
        self.mutate(|lines| lines.retain(|l| !l.matches(product_id, variant_id)));
    }

    /// Replace the quantity of a line.
    ///
    /// A quantity of zero or less removes the line. Setting the quantity of
    /// a line that is not in the cart does nothing.
    pub fn set_quantity(&self, product_id: &ProductId, variant_id: &VariantId, quantity: i64) {
        let Ok(quantity) = u32::try_from(quantity) else {
            if quantity <= 0 {
                self.remove(product_id, variant_id);
            } else {
                self.set_quantity(product_id, variant_id, i64::from(u32::MAX));
            }
            return;
        };
        if quantity == 0 {
            self.remove(product_id, variant_id);
            return;
        }
        self.mutate(|lines| {
            if let Some(line) = lines
                .iter_mut()
                .find(|l| l.matches(product_id, variant_id))
            {
                line.quantity = quantity;
            }
        });
    }

    /// Empty the cart.
    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.read().iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of `price_snapshot * quantity` across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.read().iter().map(CartLine::line_total).sum()
    }

    /// Snapshot of the lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.read().clone()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Subscribe to the line count (the header badge).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.inner.count_tx.subscribe()
    }

    /// Load a cart previously written with [`CartStore::save`].
    ///
    /// Missing or malformed data loads as an empty cart. Stored lines that
    /// break the cart invariants (zero quantity, duplicate variants) are
    /// folded back into shape.
    #[must_use]
    pub fn load(storage: &dyn KeyValueStorage) -> Self {
        let raw = match storage.get(keys::CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored cart");
                return Self::new();
            }
        };

        let stored: Vec<CartLine> = match serde_json::from_str(&raw) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed stored cart");
                return Self::new();
            }
        };

        let cart = Self::new();
        for line in stored {
            cart.add(
                line.product_id,
                line.variant_id,
                line.size,
                line.quantity,
                line.price_snapshot,
            );
        }
        cart
    }

    /// Write the current lines to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines cannot be encoded or storage fails.
    pub fn save(&self, storage: &dyn KeyValueStorage) -> Result<(), StorageError> {
        let json = serde_json::to_string(&*self.read()).map_err(|source| StorageError::Encode {
            key: keys::CART.to_string(),
            source,
        })?;
        storage.set(keys::CART, &json)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<CartLine>> {
        self.inner.lines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, f: impl FnOnce(&mut Vec<CartLine>)) {
        let count = {
            let mut lines = self
                .inner
                .lines
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            f(&mut lines);
            lines.len()
        };
        self.inner.count_tx.send_if_modified(|current| {
            let changed = *current != count;
            *current = count;
            changed
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::session::MemoryStorage;

    use super::*;

    fn ids(product: &str, variant: &str) -> (ProductId, VariantId) {
        (ProductId::new(product), VariantId::new(variant))
    }

    #[test]
    fn test_add_same_variant_twice_increments_quantity() {
        let cart = CartStore::new();
        let (p, v) = ids("p1", "v1");

        cart.add(p.clone(), v.clone(), "M", 1, Price::from_rupees(999));
        cart.add(p, v, "M", 2, Price::from_rupees(999));

        assert_eq!(cart.count(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_count_is_distinct_lines_not_quantity() {
        let cart = CartStore::new();
        cart.add(ProductId::new("p1"), VariantId::new("v1"), "M", 5, Price::from_rupees(100));
        cart.add(ProductId::new("p1"), VariantId::new("v2"), "L", 1, Price::from_rupees(100));

        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total_quantity(), 6);
        assert_eq!(cart.subtotal(), Price::from_rupees(600));
    }

    #[test]
    fn test_add_zero_quantity_adds_one() {
        let cart = CartStore::new();
        cart.add(ProductId::new("p1"), VariantId::new("v1"), "S", 0, Price::from_rupees(10));
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_remove_missing_line_is_noop() {
        let cart = CartStore::new();
        cart.add(ProductId::new("p1"), VariantId::new("v1"), "M", 1, Price::from_rupees(10));
        let before = cart.lines();

        let (p, v) = ids("p9", "v9");
        cart.remove(&p, &v);

        assert_eq!(cart.lines(), before);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let cart = CartStore::new();
        let (p, v) = ids("p1", "v1");
        cart.add(p.clone(), v.clone(), "M", 4, Price::from_rupees(10));

        cart.set_quantity(&p, &v, 2);
        assert_eq!(cart.lines()[0].quantity, 2);

        cart.set_quantity(&p, &v, -3);
        assert!(cart.is_empty());

        cart.add(p.clone(), v.clone(), "M", 4, Price::from_rupees(10));
        cart.set_quantity(&p, &v, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_on_missing_line_does_not_insert() {
        let cart = CartStore::new();
        let (p, v) = ids("p1", "v1");
        cart.set_quantity(&p, &v, 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clones_observe_mutations_immediately() {
        let cart = CartStore::new();
        let header = cart.clone();

        cart.add(ProductId::new("p1"), VariantId::new("v1"), "M", 1, Price::from_rupees(10));
        assert_eq!(header.count(), 1);

        header.clear();
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_subscribe_tracks_line_count() {
        let cart = CartStore::new();
        let mut badge = cart.subscribe();
        assert_eq!(*badge.borrow(), 0);

        cart.add(ProductId::new("p1"), VariantId::new("v1"), "M", 1, Price::from_rupees(10));
        assert!(badge.has_changed().unwrap());
        assert_eq!(*badge.borrow_and_update(), 1);

        // Same line again: quantity changes, badge does not.
        cart.add(ProductId::new("p1"), VariantId::new("v1"), "M", 1, Price::from_rupees(10));
        assert!(!badge.has_changed().unwrap());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let storage = MemoryStorage::new();
        let cart = CartStore::new();
        cart.add(ProductId::new("p1"), VariantId::new("v1"), "M", 2, Price::from_rupees(10));
        cart.add(ProductId::new("p2"), VariantId::new("v3"), "XL", 1, Price::from_rupees(25));
        cart.save(&storage).unwrap();

        let loaded = CartStore::load(&storage);
        assert_eq!(loaded.lines(), cart.lines());
    }

    #[test]
    fn test_load_folds_duplicate_stored_lines() {
        let storage = MemoryStorage::new();
        storage
            .set(
                keys::CART,
                r#"[
                    {"productId":"p1","variantId":"v1","size":"M","quantity":1,"priceSnapshot":10},
                    {"productId":"p1","variantId":"v1","size":"M","quantity":0,"priceSnapshot":10}
                ]"#,
            )
            .unwrap();

        let cart = CartStore::load(&storage);
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let storage = MemoryStorage::new();
        storage.set(keys::CART, "[{]").unwrap();
        assert!(CartStore::load(&storage).is_empty());
    }
}
