//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends. Every variant maps to a
//! message that is safe to show a shopper; failures that point at a bug or
//! an outage are captured to Sentry when reported.

use navdana_core::User;
use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::session::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Remote API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Login flow failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session or cart storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not signed in or lacks the role.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error should be captured to Sentry.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Api(ApiError::Api { status, .. }) => *status >= 500,
            Self::Api(_) | Self::Storage(_) | Self::Config(_) => true,
            Self::Auth(AuthError::Storage(_)) => true,
            _ => false,
        }
    }

    /// Message that is safe to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Api { status: 401 | 403, .. }) => {
                "Please log in again".to_string()
            }
            Self::Api(ApiError::Api { status, message }) if *status < 500 => message.clone(),
            Self::Api(_) => "Could not reach the store, please try again".to_string(),
            Self::Auth(err) => err.user_message(),
            Self::Storage(_) => "Could not save your data locally".to_string(),
            Self::Config(err) => err.to_string(),
            _ => self.to_string(),
        }
    }

    /// Log the error and capture it to Sentry when it is reportable.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Operation rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the signed-in user to every later Sentry event.
pub fn set_sentry_user(user: &User) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: Some(user.email.clone()),
            ..Default::default()
        }));
        scope.set_tag("role", user.role.as_str());
    });
}

/// Forget the user after logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
        scope.remove_tag("role");
    });
}

/// Record a step of the user's trail, shown with any later Sentry event.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    sentry::add_breadcrumb(breadcrumb(category, message, data));
}

fn breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) -> sentry::Breadcrumb {
    sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        data: data
            .iter()
            .map(|(key, value)| ((*key).to_string(), serde_json::Value::from(*value)))
            .collect(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("quantity must be a number".to_string());
        assert_eq!(err.to_string(), "Bad request: quantity must be a number");
    }

    #[test]
    fn test_user_messages_hide_server_details() {
        let server = AppError::Api(ApiError::Api {
            status: 502,
            message: "upstream exploded at 10.0.0.3".to_string(),
        });
        assert!(server.is_reportable());
        assert!(!server.user_message().contains("10.0.0.3"));

        let client = AppError::Api(ApiError::Api {
            status: 404,
            message: "Product not found".to_string(),
        });
        assert!(!client.is_reportable());
        assert_eq!(client.user_message(), "Product not found");

        let expired = AppError::Api(ApiError::Api {
            status: 401,
            message: "jwt expired".to_string(),
        });
        assert_eq!(expired.user_message(), "Please log in again");
    }

    #[test]
    fn test_breadcrumb_carries_data() {
        let crumb = breadcrumb("cart", "Added to cart", &[("product_id", "p1"), ("size", "M")]);
        assert_eq!(crumb.category.as_deref(), Some("cart"));
        assert_eq!(crumb.data.get("product_id"), Some(&serde_json::Value::from("p1")));
        assert_eq!(crumb.data.len(), 2);
    }

    #[test]
    fn test_auth_errors_use_flow_messages() {
        let err = AppError::from(AuthError::EmptyEmail);
        assert_eq!(err.user_message(), "Please enter your email");
        assert!(!err.is_reportable());
    }
}
