//! Catalog records: products, variants and categories.

use serde::{Deserialize, Serialize};

use super::{CategoryId, Price, ProductId, VariantId};

/// A product as listed by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Remote document ID.
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    /// Product title.
    pub name: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Selling price.
    pub price: Price,
    /// Original price shown struck through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike_price: Option<Price>,
    /// Gallery images, primary first.
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Category the product is filed under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<serde_json::Value>,
    /// Size variants.
    #[serde(default, rename = "variant", alias = "variants")]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// The primary image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }

    /// Discount against the strike price, when the product is on sale.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        self.strike_price
            .and_then(|strike| self.price.discount_percent(strike))
    }

    /// Variants that can still be ordered.
    pub fn sizes_in_stock(&self) -> impl Iterator<Item = &ProductVariant> {
        self.variants.iter().filter(|v| v.in_stock())
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id.as_ref() == Some(id))
    }
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A size variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Variant document ID. Older products embed variants without one.
    #[serde(default, rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<VariantId>,
    /// Size label (e.g. "M", "XL", "Free Size").
    #[serde(default)]
    pub size: String,
    /// Units in stock.
    #[serde(default)]
    pub stock: i64,
    /// Variant-specific price, when it differs from the product price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

impl ProductVariant {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Remote document ID.
    #[serde(rename = "_id", alias = "id")]
    pub id: CategoryId,
    /// Category name shown in the navigation bar.
    pub name: String,
    /// Inactive categories are hidden from navigation.
    #[serde(default)]
    pub is_active: bool,
    /// Banner image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
