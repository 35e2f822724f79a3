//! Remote API client.
//!
//! Thin typed wrapper over the storefront's REST API (`/api/v1`). Catalog,
//! OTP and public form endpoints live here; the admin surface has its own
//! client in `navdana-admin`.

mod types;

use std::sync::Arc;

use navdana_core::{Category, CategoryId, Product, User};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::StorefrontConfig;

pub use types::{
    CategoryList, ContactForm, EmailRequest, ProductList, SearchResults, VerifyRequest,
    VerifyResponse, error_message,
};

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of an API error response, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The user record and bearer token issued by a successful OTP verification.
pub struct VerifiedSession {
    pub user: User,
    pub token: SecretString,
}

impl std::fmt::Debug for VerifiedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifiedSession")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Client for the storefront's public API.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Arc<str>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .user_agent(concat!("navdana-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: Arc::from(config.api_base_url.as_str()),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be parsed.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let list: CategoryList = self.get_json(&self.endpoint("category")).await?;
        Ok(list.categories)
    }

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be parsed.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        let list: ProductList = self.get_json(&self.endpoint("product")).await?;
        Ok(list.into_products())
    }

    /// List the products filed under a category.
    ///
    /// An envelope with `success: false` yields no products.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be parsed.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn products_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        let mut url = Url::parse(&self.endpoint("product/category"))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Parse("API base URL cannot have path segments".to_string()))?
            .push(category_id.as_str());

        let list: ProductList = self.get_json(url.as_str()).await?;
        Ok(list.into_products())
    }

    /// Search products by keyword.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be parsed.
    #[instrument(skip(self))]
    pub async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = Url::parse(&self.endpoint("product/search"))?;
        url.query_pairs_mut().append_pair("keyword", keyword);

        let results: SearchResults = self.get_json(url.as_str()).await?;
        Ok(results.products)
    }

    // =========================================================================
    // OTP login
    // =========================================================================

    /// Ask the API to email a one-time code.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the address.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, email: &str) -> Result<(), ApiError> {
        self.post_unit(&self.endpoint("user/send-otp"), &EmailRequest { email })
            .await
    }

    /// Exchange an emailed code for a user record and bearer token.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the code is rejected, or the
    /// response carries no user or token.
    #[instrument(skip(self, otp))]
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<VerifiedSession, ApiError> {
        let response: VerifyResponse = self
            .post_json(&self.endpoint("user/verify"), &VerifyRequest { email, otp })
            .await?;

        if response.token.is_empty() {
            return Err(ApiError::Parse("verify response has an empty token".to_string()));
        }

        Ok(VerifiedSession {
            user: response.user,
            token: SecretString::from(response.token),
        })
    }

    // =========================================================================
    // Public forms
    // =========================================================================

    /// Send a contact page message.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the message.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn submit_contact(&self, form: &ContactForm) -> Result<(), ApiError> {
        self.post_unit(&self.endpoint("contact"), form).await
    }

    /// Subscribe an email to the newsletter.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the address.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, email: &str) -> Result<(), ApiError> {
        self.post_unit(&self.endpoint("subscribe"), &EmailRequest { email })
            .await
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn post_unit<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<(), ApiError> {
        let response = self.client.post(url).json(body).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`ApiError::Api`].
///
/// # Errors
///
/// Returns [`ApiError::Api`] carrying the body's `message` or `error` field
/// (or the raw body) when the status is not a success.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body
        }
    });

    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&StorefrontConfig::with_api_base(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let api = client("http://127.0.0.1:4000/api/v1/");
        assert_eq!(api.base_url(), "http://127.0.0.1:4000/api/v1");
        assert_eq!(
            api.endpoint("/product/search"),
            "http://127.0.0.1:4000/api/v1/product/search"
        );
    }

    #[test]
    fn test_api_error_status() {
        let err = ApiError::Api {
            status: 401,
            message: "Invalid OTP".to_string(),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "API error: 401 - Invalid OTP");
        assert_eq!(ApiError::Parse("x".to_string()).status(), None);
    }

    #[test]
    fn test_verified_session_debug_redacts_token() {
        let session = VerifiedSession {
            user: serde_json::from_str(r#"{"_id":"u1","email":"a@b.c","role":"admin"}"#).unwrap(),
            token: SecretString::from("bearer-xyz"),
        };
        let debug = format!("{session:?}");
        assert!(!debug.contains("bearer-xyz"));
    }
}
