//! Navigation and public form commands.

use std::fmt::Write as _;

use navdana_storefront::api::ContactForm;
use navdana_storefront::error::AppError;
use navdana_storefront::routes::Route;
use navdana_storefront::state::AppState;

use super::CommandResult;
use super::catalog::{render_nav, render_products};

/// `navdana open PATH`: resolve a path through the guard and show the page.
pub async fn open(state: &AppState, path: &str) -> CommandResult {
    let mut navigator = state.navigator();
    let navigation = navigator.open(path);

    let mut out = String::new();
    if navigation.redirected() {
        let _ = writeln!(
            out,
            "{} requires admin access; redirected to {}",
            navigation.requested, navigation.location
        );
    } else {
        let _ = writeln!(out, "{}", navigation.location);
    }

    let catalog = state.catalog();
    match &navigation.location {
        Route::Home => out.push_str(&render_nav(&catalog.nav_categories().await)),
        Route::AllProducts => out.push_str(&render_products(&catalog.products().await)),
        Route::Collection(id) => out.push_str(&render_products(&catalog.products_in(id).await)),
        Route::Search { keyword } => out.push_str(&render_products(&catalog.search(keyword).await)),
        Route::Cart => out.push_str(&super::cart::list(state)?),
        Route::Info(page) => {
            let _ = writeln!(out, "{}", page.title());
        }
        Route::NotFound(_) => out.push_str("Coming soon.\n"),
        Route::Product(_) | Route::MyOrders | Route::Dashboard(_) => {}
    }
    Ok(out)
}

/// `navdana contact --name .. --email .. --message .. [--phone ..]`
pub async fn contact(state: &AppState, form: ContactForm) -> CommandResult {
    if let Some(field) = form.missing_field() {
        return Err(AppError::BadRequest(format!("{field} is required")).into());
    }
    state.api().submit_contact(&form).await?;
    Ok("Thanks! We'll get back to you soon.\n".to_string())
}

/// `navdana subscribe EMAIL`
pub async fn subscribe(state: &AppState, email: &str) -> CommandResult {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("email is required".to_string()).into());
    }
    state.api().subscribe(email).await?;
    Ok(format!("Subscribed {email} to the newsletter.\n"))
}
