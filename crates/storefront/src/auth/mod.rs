//! Email OTP login flow.
//!
//! ```text
//! Anonymous --begin--> EmailEntry --request_otp--> OtpPending --verify_otp--> Authenticated
//!     ^                    |                           |                           |
//!     +------cancel--------+------------cancel---------+-----------logout----------+
//! ```
//!
//! Failed requests leave the state where it was (a failed OTP request returns
//! to `EmailEntry`) and are never retried automatically.

mod error;

pub use error::AuthError;

use std::future::Future;

use navdana_core::User;

use crate::api::{ApiClient, ApiError, VerifiedSession};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::notify::Toast;
use crate::routes::Route;
use crate::session::SessionStore;

/// Toast shown after a successful verification.
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

/// The OTP endpoints of the remote API.
pub trait OtpApi: Send + Sync {
    /// Ask the API to email a code.
    fn send_otp(&self, email: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Exchange a code for a session.
    fn verify_otp(
        &self,
        email: &str,
        otp: &str,
    ) -> impl Future<Output = Result<VerifiedSession, ApiError>> + Send;
}

impl OtpApi for ApiClient {
    fn send_otp(&self, email: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        Self::send_otp(self, email)
    }

    fn verify_otp(
        &self,
        email: &str,
        otp: &str,
    ) -> impl Future<Output = Result<VerifiedSession, ApiError>> + Send {
        Self::verify_otp(self, email, otp)
    }
}

/// Where the login flow currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    EmailEntry,
    OtpPending { email: String },
    Authenticated(User),
}

impl AuthState {
    const fn name(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::EmailEntry => "entering email",
            Self::OtpPending { .. } => "awaiting OTP",
            Self::Authenticated(_) => "signed in",
        }
    }
}

/// Drives the OTP login and keeps the session store in step with it.
pub struct AuthFlow<A = ApiClient> {
    api: A,
    session: SessionStore,
    toast: Toast,
    state: AuthState,
    last_error: Option<String>,
}

impl<A> std::fmt::Debug for AuthFlow<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("state", &self.state)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl<A: OtpApi> AuthFlow<A> {
    /// Create the flow, restoring `Authenticated` if a user is already stored.
    #[must_use]
    pub fn new(api: A, session: SessionStore) -> Self {
        Self::with_toast(api, session, Toast::new())
    }

    /// Like [`AuthFlow::new`], reporting success on a shared toast.
    #[must_use]
    pub fn with_toast(api: A, session: SessionStore, toast: Toast) -> Self {
        let state = session
            .current_user()
            .map_or(AuthState::Anonymous, AuthState::Authenticated);
        Self {
            api,
            session,
            toast,
            state,
            last_error: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    /// User-facing message of the most recent failure, cleared on success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub const fn toast(&self) -> &Toast {
        &self.toast
    }

    /// Open the email prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidState`] when already signed in or waiting
    /// for a code.
    pub fn begin(&mut self) -> Result<(), AuthError> {
        match self.state {
            AuthState::Anonymous | AuthState::EmailEntry => {
                self.state = AuthState::EmailEntry;
                self.last_error = None;
                Ok(())
            }
            _ => Err(self.invalid("start a login")),
        }
    }

    /// Wait for a code that was requested earlier, e.g. by another process.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptyEmail`] for a blank address and
    /// [`AuthError::InvalidState`] when already signed in.
    pub fn resume_pending(&mut self, email: &str) -> Result<(), AuthError> {
        if self.is_authenticated() {
            return Err(self.invalid("resume a login"));
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(self.fail(AuthError::EmptyEmail));
        }
        self.state = AuthState::OtpPending {
            email: email.to_string(),
        };
        Ok(())
    }

    /// Request a code for `email`.
    ///
    /// Allowed from `EmailEntry`, and from `OtpPending` to resend.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptyEmail`] without calling the API when the
    /// address is blank, and [`AuthError::SendOtp`] when the API call fails.
    pub async fn request_otp(&mut self, email: &str) -> Result<(), AuthError> {
        if !matches!(
            self.state,
            AuthState::EmailEntry | AuthState::OtpPending { .. }
        ) {
            return Err(self.invalid("request an OTP"));
        }

        let email = email.trim();
        if email.is_empty() {
            return Err(self.fail(AuthError::EmptyEmail));
        }

        add_breadcrumb("auth", "OTP requested", &[("email", email)]);
        match self.api.send_otp(email).await {
            Ok(()) => {
                tracing::info!("OTP sent");
                self.state = AuthState::OtpPending {
                    email: email.to_string(),
                };
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "OTP request failed");
                self.state = AuthState::EmailEntry;
                Err(self.fail(AuthError::SendOtp(e)))
            }
        }
    }

    /// Verify the emailed code.
    ///
    /// On success the returned user and token are persisted, a
    /// "Login successful" toast is shown and the flow is `Authenticated`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptyOtp`] or [`AuthError::EmptyEmail`] without
    /// calling the API for blank input, [`AuthError::VerifyOtp`] when the
    /// code is rejected, and [`AuthError::Storage`] when the session cannot
    /// be saved. The flow stays in `OtpPending` on every failure.
    pub async fn verify_otp(&mut self, email: &str, code: &str) -> Result<&User, AuthError> {
        if !matches!(self.state, AuthState::OtpPending { .. }) {
            return Err(self.invalid("verify an OTP"));
        }

        let code = code.trim();
        if code.is_empty() {
            return Err(self.fail(AuthError::EmptyOtp));
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(self.fail(AuthError::EmptyEmail));
        }

        add_breadcrumb("auth", "OTP submitted", &[("email", email)]);
        let VerifiedSession { user, token } = match self.api.verify_otp(email, code).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "OTP verification failed");
                return Err(self.fail(AuthError::VerifyOtp(e)));
            }
        };

        if let Err(e) = self.session.save(&user, &token) {
            return Err(self.fail(AuthError::Storage(e)));
        }

        set_sentry_user(&user);
        tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
        self.toast.show(LOGIN_SUCCESS_MESSAGE);
        self.last_error = None;
        self.state = AuthState::Authenticated(user);

        match &self.state {
            AuthState::Authenticated(user) => Ok(user),
            _ => Err(self.invalid("verify an OTP")),
        }
    }

    /// Close the login prompt. Does nothing unless a login is in progress.
    pub fn cancel(&mut self) {
        if matches!(
            self.state,
            AuthState::EmailEntry | AuthState::OtpPending { .. }
        ) {
            self.state = AuthState::Anonymous;
            self.last_error = None;
        }
    }

    /// Sign out and return the route to show next (home).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the stored session cannot be
    /// removed; the flow is left unchanged in that case.
    pub fn logout(&mut self) -> Result<Route, AuthError> {
        let user_id = self.user().map(|u| u.id.to_string());
        self.session.clear()?;
        clear_sentry_user();
        match &user_id {
            Some(id) => add_breadcrumb("auth", "Signed out", &[("user_id", id.as_str())]),
            None => add_breadcrumb("auth", "Signed out", &[]),
        }
        tracing::info!("Signed out");
        self.state = AuthState::Anonymous;
        self.last_error = None;
        Ok(Route::Home)
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        self.last_error = Some(err.user_message());
        err
    }

    fn invalid(&self, action: &'static str) -> AuthError {
        AuthError::InvalidState {
            action,
            state: self.state.name(),
        }
    }
}
