//! Command implementations.
//!
//! Each command returns the text to print on stdout; diagnostics go through
//! `tracing` to stderr.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod pages;

use navdana_admin::AdminError;
use navdana_storefront::error::AppError;
use thiserror::Error;

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Admin(#[from] AdminError),
}

impl CliError {
    /// Message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::App(err) => err.user_message(),
            Self::Admin(err) => err.user_message(),
        }
    }

    /// Log the failure, capturing it to Sentry where that is useful.
    pub fn report(&self) {
        match self {
            Self::App(err) => err.report(),
            Self::Admin(err) => {
                tracing::warn!(error = %err, "Admin command failed");
            }
        }
    }
}

macro_rules! via_app_error {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for CliError {
                fn from(err: $ty) -> Self {
                    Self::App(err.into())
                }
            }
        )+
    };
}

via_app_error!(
    navdana_storefront::api::ApiError,
    navdana_storefront::auth::AuthError,
    navdana_storefront::session::StorageError,
    navdana_storefront::config::ConfigError,
);

/// Result of a command: the text to print.
pub type CommandResult = Result<String, CliError>;
