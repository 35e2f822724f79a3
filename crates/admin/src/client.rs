//! Dashboard API client.
//!
//! Every request carries the signed-in admin's bearer token. The API checks
//! the role itself; the client does not.

use navdana_core::{ContactId, ContactMessage, Subscriber, User, UserId};
use navdana_storefront::api::error_message;
use navdana_storefront::config::StorefrontConfig;
use navdana_storefront::session::SessionStore;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::error::AdminError;
use crate::types::{ContactList, MailRequest, SubscriberList, UserForm, UserList};

const FETCH_USERS: &str = "Error fetching users";
const SAVE_USER: &str = "Error saving user";
const LOAD_CONTACTS: &str = "Failed to load contacts";
const DELETE_CONTACT: &str = "Failed to delete contact";
const FETCH_SUBSCRIBERS: &str = "Error fetching subscribers";
const SEND_MAIL: &str = "Failed to send mail";

/// Client for the admin dashboard endpoints.
#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a client that authenticates with `token`.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &StorefrontConfig, token: &SecretString) -> Result<Self, AdminError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| AdminError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()
            .map_err(|source| AdminError::Http {
                message: "Failed to build HTTP client",
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Create a client for whoever is signed in.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotSignedIn`] when no token is stored.
    pub fn from_session(config: &StorefrontConfig, session: &SessionStore) -> Result<Self, AdminError> {
        let token = session.token().ok_or(AdminError::NotSignedIn)?;
        Self::new(config, &token)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn endpoint_with_id(&self, path: &str, id: &str) -> Result<String, AdminError> {
        let mut url = Url::parse(&self.endpoint(path))?;
        url.path_segments_mut()
            .map_err(|()| AdminError::Validation("API base URL cannot have path segments".to_string()))?
            .push(id);
        Ok(url.into())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// List every account.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not a user list.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, AdminError> {
        let list: UserList = fetch_json(self.client.get(self.endpoint("user")), FETCH_USERS).await?;
        Ok(list.into_vec())
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for a blank name or email, or an
    /// error if the API rejects the account.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn create_user(&self, form: &UserForm) -> Result<(), AdminError> {
        validate_user_form(form)?;
        let request = self.client.post(self.endpoint("user")).json(&form.create_body());
        send(request, SAVE_USER).await?;
        debug!("User created");
        Ok(())
    }

    /// Update an account. A blank password leaves the current one in place.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for a blank name or email, or an
    /// error if the API rejects the update.
    #[instrument(skip(self, form), fields(user_id = %id))]
    pub async fn update_user(&self, id: &UserId, form: &UserForm) -> Result<(), AdminError> {
        validate_user_form(form)?;
        let url = self.endpoint_with_id("user", id.as_str())?;
        send(self.client.put(url).json(&form.update_body()), SAVE_USER).await?;
        debug!("User updated");
        Ok(())
    }

    // =========================================================================
    // Contact messages
    // =========================================================================

    /// List contact page messages.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not a list.
    #[instrument(skip(self))]
    pub async fn list_contacts(&self) -> Result<Vec<ContactMessage>, AdminError> {
        let list: ContactList =
            fetch_json(self.client.get(self.endpoint("contact")), LOAD_CONTACTS).await?;
        Ok(list.into_vec())
    }

    /// Delete a contact message.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API refuses.
    #[instrument(skip(self), fields(contact_id = %id))]
    pub async fn delete_contact(&self, id: &ContactId) -> Result<(), AdminError> {
        let url = self.endpoint_with_id("contact", id.as_str())?;
        send(self.client.delete(url), DELETE_CONTACT).await?;
        Ok(())
    }

    // =========================================================================
    // Newsletter
    // =========================================================================

    /// List newsletter subscribers.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not JSON.
    #[instrument(skip(self))]
    pub async fn list_subscribers(&self) -> Result<Vec<Subscriber>, AdminError> {
        let list: SubscriberList =
            fetch_json(self.client.get(self.endpoint("subscribe")), FETCH_SUBSCRIBERS).await?;
        Ok(list.into_vec())
    }

    /// Email every subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for a blank message, or an error if
    /// the API refuses to send.
    #[instrument(skip(self, message))]
    pub async fn send_mail(&self, message: &str) -> Result<(), AdminError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AdminError::Validation("Message cannot be empty".to_string()));
        }
        let request = self
            .client
            .post(self.endpoint("subscribe/send-mail"))
            .json(&MailRequest { message });
        send(request, SEND_MAIL).await?;
        debug!("Subscriber mail sent");
        Ok(())
    }
}

fn validate_user_form(form: &UserForm) -> Result<(), AdminError> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() {
        return Err(AdminError::Validation(
            "Name and email are required".to_string(),
        ));
    }
    Ok(())
}

/// Send a request and fail on a non-2xx status.
///
/// The error message prefers the body's `message`, then `error`, then
/// `default`.
async fn send(request: RequestBuilder, default: &'static str) -> Result<reqwest::Response, AdminError> {
    let response = request.send().await.map_err(|source| AdminError::Http {
        message: default,
        source,
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AdminError::Api {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or_else(|| default.to_string()),
    })
}

async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    default: &'static str,
) -> Result<T, AdminError> {
    let response = send(request, default).await?;
    let body = response.text().await.map_err(|source| AdminError::Http {
        message: default,
        source,
    })?;
    serde_json::from_str(&body).map_err(|e| AdminError::Parse {
        message: default,
        details: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use navdana_core::Role;

    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig::with_api_base("http://127.0.0.1:9/api/v1").unwrap()
    }

    #[test]
    fn test_from_session_requires_token() {
        let session = SessionStore::in_memory();
        let err = AdminClient::from_session(&config(), &session).unwrap_err();
        assert!(matches!(err, AdminError::NotSignedIn));
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let err = AdminClient::new(&config(), &SecretString::from("abc\ndef")).unwrap_err();
        assert!(matches!(err, AdminError::InvalidToken));
    }

    #[test]
    fn test_endpoint_with_id_escapes_segment() {
        let client = AdminClient::new(&config(), &SecretString::from("t")).unwrap();
        assert_eq!(
            client.endpoint_with_id("contact", "c 1").unwrap(),
            "http://127.0.0.1:9/api/v1/contact/c%201"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = AdminClient::new(&config(), &SecretString::from("very-secret")).unwrap();
        assert!(!format!("{client:?}").contains("very-secret"));
    }

    #[tokio::test]
    async fn test_blank_mail_is_rejected_before_request() {
        let client = AdminClient::new(&config(), &SecretString::from("t")).unwrap();
        let err = client.send_mail("   ").await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
    }

    #[tokio::test]
    async fn test_blank_user_form_is_rejected_before_request() {
        let client = AdminClient::new(&config(), &SecretString::from("t")).unwrap();
        let form = UserForm {
            email: "x@navdana.com".to_string(),
            role: Role::Customer,
            ..UserForm::default()
        };
        let err = client.create_user(&form).await.unwrap_err();
        assert_eq!(err.user_message(), "Name and email are required");
    }
}
