//! Login, logout and identity commands.
//!
//! `login` and `verify` run in separate processes, so `verify` resumes the
//! pending login for the given email instead of walking the whole flow.

use std::fmt::Write as _;

use navdana_core::User;
use navdana_storefront::state::AppState;

use super::CommandResult;

/// `navdana login EMAIL`
pub async fn login(state: &AppState, email: &str) -> CommandResult {
    let mut flow = state.auth_flow();
    if let Some(user) = flow.user() {
        return Ok(format!(
            "Already signed in as {}. Run `navdana logout` first.\n",
            user.email
        ));
    }

    flow.begin()?;
    flow.request_otp(email).await?;
    Ok(format!(
        "OTP sent to {}. Run `navdana verify {} <CODE>`.\n",
        email.trim(),
        email.trim()
    ))
}

/// `navdana verify EMAIL CODE`
pub async fn verify(state: &AppState, email: &str, code: &str) -> CommandResult {
    let mut flow = state.auth_flow();
    flow.resume_pending(email)?;
    let user = flow.verify_otp(email, code).await?.clone();

    let mut out = String::new();
    if let Some(message) = flow.toast().visible() {
        let _ = writeln!(out, "{message}");
    }
    out.push_str(&render_user(&user));
    Ok(out)
}

/// `navdana logout`
pub fn logout(state: &AppState) -> CommandResult {
    let mut flow = state.auth_flow();
    let next = flow.logout()?;
    Ok(format!("Signed out. Now at {next}\n"))
}

/// `navdana whoami`
pub fn whoami(state: &AppState) -> CommandResult {
    Ok(state
        .session()
        .current_user()
        .map_or_else(|| "Not signed in.\n".to_string(), |user| render_user(&user)))
}

pub(crate) fn render_user(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Signed in as {} <{}>", user.display_name(), user.email);
    let _ = writeln!(out, "Role:   {}", user.role);
    if let Some(phone) = &user.phone_number {
        let _ = writeln!(out, "Phone:  {phone}");
    }
    let _ = writeln!(out, "Orders: {}", user.orders.len());
    out
}
