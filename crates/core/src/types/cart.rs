//! Cart line record.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, VariantId};

/// One product-variant-quantity entry in the cart.
///
/// A cart never holds two lines with the same `(product_id, variant_id)` and
/// a line's quantity is always at least one; the cart store enforces both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product being bought.
    pub product_id: ProductId,
    /// Size variant being bought.
    pub variant_id: VariantId,
    /// Size label captured when the line was added.
    pub size: String,
    /// Number of units.
    pub quantity: u32,
    /// Unit price at the time the line was added.
    pub price_snapshot: Price,
}

impl CartLine {
    /// Whether this line is for the given product variant.
    #[must_use]
    pub fn matches(&self, product_id: &ProductId, variant_id: &VariantId) -> bool {
        &self.product_id == product_id && &self.variant_id == variant_id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price_snapshot * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let line = CartLine {
            product_id: ProductId::new("p1"),
            variant_id: VariantId::new("v1"),
            size: "M".to_string(),
            quantity: 3,
            price_snapshot: Price::from_rupees(499),
        };
        assert_eq!(line.line_total(), Price::from_rupees(1497));
        assert!(line.matches(&ProductId::new("p1"), &VariantId::new("v1")));
        assert!(!line.matches(&ProductId::new("p1"), &VariantId::new("v2")));
    }
}
