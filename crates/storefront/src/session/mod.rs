//! Persisted session store.
//!
//! Holds the authenticated [`User`] record and bearer token in durable
//! key/value storage under the keys in [`keys`]. The store is a cheap handle;
//! clones share the same backend, so a write through one handle is visible to
//! every other handle immediately.

pub mod storage;

use std::path::Path;
use std::sync::Arc;

use navdana_core::User;
use secrecy::{ExposeSecret, SecretString};

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};

/// Storage keys shared with the rest of the storefront.
pub mod keys {
    /// Serialized [`User`](navdana_core::User) JSON.
    pub const USER: &str = "user";

    /// Raw bearer token.
    pub const TOKEN: &str = "token";

    /// Serialized cart lines.
    pub const CART: &str = "cart";
}

/// The authenticated user and their bearer token.
#[derive(Clone)]
pub struct Session {
    pub user: User,
    pub token: SecretString,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Handle to the persisted session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Wrap an existing storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// A store that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// A store backed by a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's directory cannot be created.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self::new(Arc::new(FileStorage::open(path.as_ref())?)))
    }

    /// The underlying storage backend.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    /// The stored user, if any.
    ///
    /// Unreadable storage and malformed records both read as "no user": the
    /// caller only ever needs to know whether someone is signed in.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        let raw = match self.storage.get(keys::USER) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored user");
                return None;
            }
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed stored user record");
                None
            }
        }
    }

    /// The stored bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        match self.storage.get(keys::TOKEN) {
            Ok(token) => token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    /// Both halves of the session, when both are present.
    #[must_use]
    pub fn snapshot(&self) -> Option<Session> {
        Some(Session {
            user: self.current_user()?,
            token: self.token()?,
        })
    }

    /// Persist a freshly issued session.
    ///
    /// The token is written before the user record, so a failed save never
    /// leaves a user behind that the route guard would accept.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be serialized or storage fails.
    pub fn save(&self, user: &User, token: &SecretString) -> Result<(), StorageError> {
        let json = serde_json::to_string(user).map_err(|source| StorageError::Encode {
            key: keys::USER.to_string(),
            source,
        })?;
        self.storage.set(keys::TOKEN, token.expose_secret())?;
        if let Err(e) = self.storage.set(keys::USER, &json) {
            if let Err(cleanup) = self.storage.remove(keys::TOKEN) {
                tracing::warn!(error = %cleanup, "Failed to roll back stored token");
            }
            return Err(e);
        }
        tracing::debug!(user_id = %user.id, "Session saved");
        Ok(())
    }

    /// Remove both the user record and the token.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(keys::USER)?;
        self.storage.remove(keys::TOKEN)?;
        tracing::debug!("Session cleared");
        Ok(())
    }
}
