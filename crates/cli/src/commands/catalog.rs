//! Catalog browsing commands.

use std::fmt::Write as _;
use std::time::Duration;

use navdana_core::{CategoryId, Product};
use navdana_storefront::catalog::NavCategory;
use navdana_storefront::state::AppState;

use super::CommandResult;

/// Pause between simulated keystrokes in `search --live`.
const KEYSTROKE_INTERVAL: Duration = Duration::from_millis(80);

/// Upper bound on waiting for a live search to settle.
const LIVE_SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

/// `navdana categories`
pub async fn categories(state: &AppState) -> CommandResult {
    Ok(render_nav(&state.catalog().nav_categories().await))
}

/// `navdana products [--category ID]`
pub async fn products(state: &AppState, category: Option<String>) -> CommandResult {
    let catalog = state.catalog();
    let products = match category {
        Some(id) => catalog.products_in(&CategoryId::new(id)).await,
        None => catalog.products().await,
    };
    Ok(render_products(&products))
}

/// `navdana search KEYWORD [--live]`
///
/// With `--live` the keyword is typed one character at a time through the
/// debounced search box, so only the final keyword is sent.
pub async fn search(state: &AppState, keyword: &str, live: bool) -> CommandResult {
    let products = if live {
        live_search(state, keyword).await
    } else {
        state.catalog().search(keyword).await
    };
    Ok(render_products(&products))
}

async fn live_search(state: &AppState, keyword: &str) -> Vec<Product> {
    let search = state.live_search();
    let mut typed = String::new();
    for ch in keyword.chars() {
        typed.push(ch);
        search.search(&typed);
        tokio::time::sleep(KEYSTROKE_INTERVAL).await;
    }
    if typed.trim().is_empty() {
        search.search(&typed);
        return Vec::new();
    }

    let mut rx = search.subscribe();
    let settled = tokio::time::timeout(LIVE_SEARCH_TIMEOUT, rx.wait_for(|s| !s.loading)).await;
    if !matches!(settled, Ok(Ok(_))) {
        tracing::warn!(keyword, "Live search did not settle in time");
    }
    search.results()
}

pub(crate) fn render_nav(categories: &[NavCategory]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{:<24} {}", category.name, category.route());
    }
    out
}

pub(crate) fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found.\n".to_string();
    }

    let mut out = String::new();
    for product in products {
        let _ = write!(out, "{:<32} {:>8}", product.name, product.price.to_string());
        if let (Some(strike), Some(percent)) = (product.strike_price, product.discount_percent()) {
            let _ = write!(out, "  (was {strike}, {percent}% off)");
        }
        let sizes: Vec<&str> = product.sizes_in_stock().map(|v| v.size.as_str()).collect();
        if !sizes.is_empty() {
            let _ = write!(out, "  sizes: {}", sizes.join("/"));
        }
        let _ = writeln!(out, "  [{}]", product.id);
    }
    out
}
