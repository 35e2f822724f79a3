//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::session::StorageError;

/// Errors that can occur during the OTP login flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email left blank.
    #[error("email is required")]
    EmptyEmail,

    /// Code left blank.
    #[error("OTP is required")]
    EmptyOtp,

    /// The API did not accept the OTP request.
    #[error("Failed to send OTP")]
    SendOtp(#[source] ApiError),

    /// The API rejected the code.
    #[error("Invalid OTP, try again")]
    VerifyOtp(#[source] ApiError),

    /// The action is not valid from the current state.
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    /// The issued session could not be stored or cleared.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Message to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyEmail => "Please enter your email".to_string(),
            Self::EmptyOtp => "Please enter OTP".to_string(),
            Self::SendOtp(_) | Self::VerifyOtp(_) => self.to_string(),
            Self::InvalidState { .. } => "Please start the login again".to_string(),
            Self::Storage(_) => "Could not save your session".to_string(),
        }
    }

    /// Whether the input was rejected before any request was made.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyEmail | Self::EmptyOtp)
    }
}
