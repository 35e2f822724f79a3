//! Admin client errors.

use thiserror::Error;

/// Errors that can occur when calling the admin endpoints.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No bearer token is stored.
    #[error("not signed in")]
    NotSignedIn,

    /// The stored token cannot be sent as a header.
    #[error("stored token is not a valid header value")]
    InvalidToken,

    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed.
    #[error("{message}: {source}")]
    Http {
        message: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Failed to parse response.
    #[error("{message}: {details}")]
    Parse {
        message: &'static str,
        details: String,
    },

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl AdminError {
    /// Message to show on the dashboard.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotSignedIn | Self::InvalidToken => "Please log in as an admin".to_string(),
            Self::Validation(message) | Self::Api { message, .. } => message.clone(),
            Self::Http { message, .. } | Self::Parse { message, .. } => (*message).to_string(),
            Self::Url(_) => "Invalid API address".to_string(),
        }
    }

    /// HTTP status of an API error response, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let err = AdminError::Api {
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.user_message(), "Email already registered");
        assert_eq!(err.status(), Some(409));

        let err = AdminError::Parse {
            message: "Error fetching users",
            details: "expected value at line 1".to_string(),
        };
        assert_eq!(err.user_message(), "Error fetching users");
        assert_eq!(AdminError::NotSignedIn.user_message(), "Please log in as an admin");
    }
}
