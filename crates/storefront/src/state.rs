//! Application state shared across front-end components.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::AuthFlow;
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::guard::{Navigator, RouteGuard};
use crate::notify::Toast;
use crate::search::LiveSearch;
use crate::session::{SessionStore, StorageError};

/// Application state shared by every page.
///
/// This struct is cheaply cloneable via `Arc`. The cart and session handles
/// inside are themselves shared, so every clone sees the same cart and the
/// same signed-in user.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    session: SessionStore,
    cart: CartStore,
    toast: Toast,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .field("cart_lines", &self.inner.cart.count())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create the state from configuration.
    ///
    /// Opens the session file named in the configuration and loads any cart
    /// saved there.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the session
    /// file's directory cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let session = SessionStore::open_file(&config.session_file)?;
        let api = ApiClient::new(&config)?;
        Ok(Self::from_parts(config, api, session))
    }

    /// Assemble the state from already-built parts.
    #[must_use]
    pub fn from_parts(config: StorefrontConfig, api: ApiClient, session: SessionStore) -> Self {
        let cart = CartStore::load(session.storage().as_ref());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                session,
                cart,
                toast: Toast::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the remote API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn toast(&self) -> &Toast {
        &self.inner.toast
    }

    /// Catalog service over the shared client.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.inner.api.clone())
    }

    /// A login flow bound to this state's session and toast.
    #[must_use]
    pub fn auth_flow(&self) -> AuthFlow {
        AuthFlow::with_toast(
            self.inner.api.clone(),
            self.inner.session.clone(),
            self.inner.toast.clone(),
        )
    }

    /// A fresh live search box using the configured quiet window.
    #[must_use]
    pub fn live_search(&self) -> LiveSearch {
        LiveSearch::new(self.inner.api.clone(), self.inner.config.search_debounce)
    }

    #[must_use]
    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.inner.session.clone())
    }

    /// A navigator starting at the home page.
    #[must_use]
    pub fn navigator(&self) -> Navigator {
        Navigator::new(self.guard())
    }

    /// Write the cart to session storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn save_cart(&self) -> Result<(), StorageError> {
        self.inner
            .cart
            .save(self.inner.session.storage().as_ref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use navdana_core::{Price, ProductId, VariantId};

    use super::*;

    fn state(session: SessionStore) -> AppState {
        let config = StorefrontConfig::with_api_base("http://127.0.0.1:9/api/v1").unwrap();
        let api = ApiClient::new(&config).unwrap();
        AppState::from_parts(config, api, session)
    }

    #[test]
    fn test_clones_share_cart() {
        let state = state(SessionStore::in_memory());
        let other = state.clone();

        state.cart().add(
            ProductId::new("p1"),
            VariantId::new("v1"),
            "M",
            1,
            Price::from_rupees(1299),
        );
        assert_eq!(other.cart().count(), 1);
    }

    #[test]
    fn test_saved_cart_is_restored() {
        let session = SessionStore::in_memory();
        let first = state(session.clone());
        first.cart().add(
            ProductId::new("p1"),
            VariantId::new("v1"),
            "M",
            2,
            Price::from_rupees(1299),
        );
        first.save_cart().unwrap();

        let second = state(session);
        assert_eq!(second.cart().lines(), first.cart().lines());
    }

    #[test]
    fn test_new_opens_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            session_file: dir.path().join("s").join("session.json"),
            ..StorefrontConfig::default()
        };
        let state = AppState::new(config).unwrap();
        assert!(state.session().current_user().is_none());
        assert!(state.cart().is_empty());
    }
}
