//! Cart commands.
//!
//! The cart is loaded from the session file on start and written back after
//! every change, so it survives between invocations.

use std::fmt::Write as _;

use navdana_core::{CartLine, Product, ProductId, VariantId};
use navdana_storefront::error::AppError;
use navdana_storefront::state::AppState;

use super::CommandResult;

/// `navdana cart list`
pub fn list(state: &AppState) -> CommandResult {
    let cart = state.cart();
    Ok(render_cart(&cart.lines(), &cart.subtotal().to_string()))
}

/// `navdana cart add PRODUCT [--size S] [--quantity N]`
///
/// Looks the product up in the catalog to pick the variant and take the
/// price snapshot.
pub async fn add(state: &AppState, product_id: &str, size: Option<&str>, quantity: u32) -> CommandResult {
    let product_id = ProductId::new(product_id);
    let product = state
        .catalog()
        .products()
        .await
        .into_iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let (variant_id, size, price) = pick_variant(&product, size)?;
    state.cart().add(product_id, variant_id, size.clone(), quantity, price);
    state.save_cart()?;

    Ok(format!(
        "Added {} ({size}) to cart. {} item(s) in cart.\n",
        product.name,
        state.cart().count()
    ))
}

/// `navdana cart set PRODUCT VARIANT QUANTITY`
pub fn set(state: &AppState, product_id: &str, variant_id: &str, quantity: i64) -> CommandResult {
    state.cart().set_quantity(
        &ProductId::new(product_id),
        &VariantId::new(variant_id),
        quantity,
    );
    state.save_cart()?;
    list(state)
}

/// `navdana cart remove PRODUCT VARIANT`
pub fn remove(state: &AppState, product_id: &str, variant_id: &str) -> CommandResult {
    state
        .cart()
        .remove(&ProductId::new(product_id), &VariantId::new(variant_id));
    state.save_cart()?;
    list(state)
}

/// `navdana cart clear`
pub fn clear(state: &AppState) -> CommandResult {
    state.cart().clear();
    state.save_cart()?;
    Ok("Cart cleared.\n".to_string())
}

/// Choose the variant to add: the requested size, or the first in stock.
fn pick_variant(
    product: &Product,
    size: Option<&str>,
) -> Result<(VariantId, String, navdana_core::Price), AppError> {
    let variant = match size {
        Some(size) => product
            .variants
            .iter()
            .find(|v| v.size.eq_ignore_ascii_case(size))
            .ok_or_else(|| AppError::BadRequest(format!("size {size} is not offered")))?,
        None => product
            .sizes_in_stock()
            .next()
            .ok_or_else(|| AppError::BadRequest("out of stock".to_string()))?,
    };

    if !variant.in_stock() {
        return Err(AppError::BadRequest(format!("size {} is out of stock", variant.size)));
    }
    let variant_id = variant
        .id
        .clone()
        .ok_or_else(|| AppError::BadRequest(format!("size {} cannot be ordered", variant.size)))?;

    Ok((
        variant_id,
        variant.size.clone(),
        variant.price.unwrap_or(product.price),
    ))
}

fn render_cart(lines: &[CartLine], subtotal: &str) -> String {
    if lines.is_empty() {
        return "Your cart is empty.\n".to_string();
    }
    let mut out = String::new();
    for line in lines {
        let _ = writeln!(
            out,
            "{} / {} ({})  x{}  {}",
            line.product_id,
            line.variant_id,
            line.size,
            line.quantity,
            line.line_total()
        );
    }
    let _ = writeln!(out, "{} line(s), subtotal {subtotal}", lines.len());
    out
}
