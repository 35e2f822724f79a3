//! Admin dashboard commands.
//!
//! # Usage
//!
//! ```bash
//! navdana admin users list
//! navdana admin users create --name "Asha" --email asha@navdana.com --role admin
//! navdana admin contacts delete 66b0c2f1
//! navdana admin subscribers send "Diwali sale starts tomorrow"
//! ```
//!
//! Every command first resolves the matching `/dashboard/...` route through
//! the route guard, so a shopper without the admin role is turned away
//! before any request is made.

use std::fmt::Write as _;

use navdana_admin::{AdminClient, UserForm};
use navdana_core::{ContactId, UserId};
use navdana_storefront::error::AppError;
use navdana_storefront::routes::{DashboardSection, Route};
use navdana_storefront::state::AppState;

use super::CommandResult;

fn client_for(state: &AppState, section: DashboardSection) -> Result<AdminClient, super::CliError> {
    let route = Route::Dashboard(section);
    if !state.guard().check(&route).is_allowed() {
        return Err(AppError::Unauthorized(format!("{route} requires the admin role")).into());
    }
    Ok(AdminClient::from_session(state.config(), state.session())?)
}

/// `navdana admin users list`
pub async fn list_users(state: &AppState) -> CommandResult {
    let users = client_for(state, DashboardSection::Users)?
        .list_users()
        .await?;

    if users.is_empty() {
        return Ok("No users.\n".to_string());
    }
    let mut out = String::new();
    for user in &users {
        let _ = writeln!(
            out,
            "{:<26} {:<32} {:<9} {}",
            user.id,
            user.email,
            user.role,
            user.name.as_deref().unwrap_or("-")
        );
    }
    Ok(out)
}

/// `navdana admin users create ...`
pub async fn create_user(state: &AppState, form: &UserForm) -> CommandResult {
    client_for(state, DashboardSection::Users)?
        .create_user(form)
        .await?;
    Ok(format!("Created user {}.\n", form.email))
}

/// `navdana admin users update ID ...`
pub async fn update_user(state: &AppState, id: &str, form: &UserForm) -> CommandResult {
    client_for(state, DashboardSection::Users)?
        .update_user(&UserId::new(id), form)
        .await?;
    Ok(format!("Updated user {id}.\n"))
}

/// `navdana admin contacts list`
pub async fn list_contacts(state: &AppState) -> CommandResult {
    let contacts = client_for(state, DashboardSection::ContactDetails)?
        .list_contacts()
        .await?;

    if contacts.is_empty() {
        return Ok("No messages.\n".to_string());
    }
    let mut out = String::new();
    for contact in &contacts {
        let _ = writeln!(out, "[{}] {} <{}>", contact.id, contact.name, contact.email);
        if let Some(phone) = &contact.phone {
            let _ = writeln!(out, "    phone: {phone}");
        }
        let _ = writeln!(out, "    {}", contact.message);
    }
    Ok(out)
}

/// `navdana admin contacts delete ID`
pub async fn delete_contact(state: &AppState, id: &str) -> CommandResult {
    client_for(state, DashboardSection::ContactDetails)?
        .delete_contact(&ContactId::new(id))
        .await?;
    Ok(format!("Deleted message {id}.\n"))
}

/// `navdana admin subscribers list`
pub async fn list_subscribers(state: &AppState) -> CommandResult {
    let subscribers = client_for(state, DashboardSection::Subscribe)?
        .list_subscribers()
        .await?;

    if subscribers.is_empty() {
        return Ok("No subscribers yet.\n".to_string());
    }
    let mut out = String::new();
    for subscriber in &subscribers {
        let _ = writeln!(out, "{}", subscriber.email);
    }
    let _ = writeln!(out, "{} subscriber(s)", subscribers.len());
    Ok(out)
}

/// `navdana admin subscribers send MESSAGE`
pub async fn send_mail(state: &AppState, message: &str) -> CommandResult {
    client_for(state, DashboardSection::Subscribe)?
        .send_mail(message)
        .await?;
    Ok("Message sent to all subscribers.\n".to_string())
}
