//! Catalog reads for page-level code.
//!
//! Pages never see a catalog error: a failed call is logged and the page
//! renders as if nothing was found. Every call goes to the network; there is
//! no response cache.

use navdana_core::{Category, CategoryId, Product};

use crate::api::ApiClient;
use crate::routes::Route;

/// ID of the synthetic navigation entry that links to every product.
pub const ALL_PRODUCTS_ID: &str = "all-products";

/// Name of the synthetic navigation entry.
pub const ALL_PRODUCTS_NAME: &str = "All Products";

/// An entry in the category navigation bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavCategory {
    pub id: CategoryId,
    pub name: String,
    pub image: Option<String>,
}

impl NavCategory {
    /// Where clicking the entry leads.
    #[must_use]
    pub fn route(&self) -> Route {
        if self.id.as_str() == ALL_PRODUCTS_ID {
            Route::AllProducts
        } else {
            Route::Collection(self.id.clone())
        }
    }
}

/// Build the navigation bar from the raw category list.
///
/// Keeps active categories only, drops any category literally named
/// "All Products" and puts the synthetic all-products entry first.
#[must_use]
pub fn nav_categories(categories: Vec<Category>) -> Vec<NavCategory> {
    let all = NavCategory {
        id: CategoryId::new(ALL_PRODUCTS_ID),
        name: ALL_PRODUCTS_NAME.to_string(),
        image: None,
    };

    std::iter::once(all)
        .chain(
            categories
                .into_iter()
                .filter(|c| c.is_active && c.name != ALL_PRODUCTS_NAME)
                .map(|c| NavCategory {
                    id: c.id,
                    name: c.name,
                    image: c.image,
                }),
        )
        .collect()
}

/// Read-only catalog service over the remote API.
#[derive(Debug, Clone)]
pub struct Catalog {
    api: ApiClient,
}

impl Catalog {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All categories, active or not.
    pub async fn categories(&self) -> Vec<Category> {
        self.api.categories().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch categories");
            Vec::new()
        })
    }

    /// Categories for the navigation bar.
    pub async fn nav_categories(&self) -> Vec<NavCategory> {
        nav_categories(self.categories().await)
    }

    /// Every product.
    pub async fn products(&self) -> Vec<Product> {
        self.api.products().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch products");
            Vec::new()
        })
    }

    /// Products in a category. The synthetic all-products ID lists everything.
    pub async fn products_in(&self, category_id: &CategoryId) -> Vec<Product> {
        if category_id.as_str() == ALL_PRODUCTS_ID {
            return self.products().await;
        }
        self.api
            .products_by_category(category_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, category_id = %category_id, "Failed to fetch category products");
                Vec::new()
            })
    }

    /// One-shot, non-debounced search as used by the search results page.
    ///
    /// A blank keyword returns nothing without touching the network.
    pub async fn search(&self, keyword: &str) -> Vec<Product> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }
        self.api.search_products(keyword).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, keyword, "Search failed");
            Vec::new()
        })
    }
}
