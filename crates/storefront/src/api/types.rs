//! Request and response bodies of the remote API.
//!
//! The API wraps most payloads in small envelopes whose shape differs per
//! endpoint. Every collection field defaults to empty so a missing key reads
//! as "nothing found" rather than a parse failure.

use navdana_core::{Category, Product, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// `GET /category`
#[derive(Debug, Default, Deserialize)]
pub struct CategoryList {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub categories: Vec<Category>,
}

/// `GET /product` and `GET /product/category/:id`
#[derive(Debug, Default, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "skip_malformed")]
    pub data: Vec<Product>,
}

impl ProductList {
    /// The products, or nothing when the API flagged the call unsuccessful.
    #[must_use]
    pub fn into_products(self) -> Vec<Product> {
        if self.success { self.data } else { Vec::new() }
    }
}

/// `GET /product/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub products: Vec<Product>,
}

/// A list in which records that do not parse are dropped with a warning
/// instead of failing the whole response. `null` reads as empty.
fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed record");
                None
            }
        })
        .collect())
}

/// `POST /user/send-otp` and `POST /subscribe`
#[derive(Debug, Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

/// `POST /user/verify`
#[derive(Debug, Serialize)]
pub struct VerifyRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

/// Body returned by a successful `POST /user/verify`.
#[derive(Deserialize)]
pub struct VerifyResponse {
    pub user: User,
    pub token: String,
}

/// `POST /contact`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
}

impl ContactForm {
    /// The first required field left blank, if any.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// Error body shape shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Pull the human readable message out of an error response body.
///
/// Prefers `message`, then `error`. Returns `None` when the body is not JSON
/// or carries neither field.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .or_else(|| parsed.error.filter(|e| !e.trim().is_empty()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message_then_error() {
        assert_eq!(
            error_message(r#"{"message":"Invalid OTP","error":"x"}"#).as_deref(),
            Some("Invalid OTP")
        );
        assert_eq!(
            error_message(r#"{"error":"Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(error_message(r#"{"message":""}"#), None);
        assert_eq!(error_message("<html>502</html>"), None);
    }

    #[test]
    fn test_unsuccessful_product_list_is_empty() {
        let list: ProductList = serde_json::from_str(
            r#"{"success":false,"data":[{"_id":"p1","name":"Kurta","price":999}]}"#,
        )
        .unwrap();
        assert!(list.into_products().is_empty());
    }

    #[test]
    fn test_incomplete_product_does_not_hide_the_rest() {
        let list: ProductList = serde_json::from_str(
            r#"{"success":true,"data":[
                {"_id":"p1","name":"Kurta","price":999},
                {"_id":"p2","name":"Draft product"}
            ]}"#,
        )
        .unwrap();
        let products = list.into_products();
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().unwrap().id.as_str(), "p1");

        let results: SearchResults =
            serde_json::from_str(r#"{"products":[{"name":"No id"},{"_id":"p3","name":"Saree","price":4999}]}"#)
                .unwrap();
        assert_eq!(results.products.len(), 1);

        let categories: CategoryList =
            serde_json::from_str(r#"{"categories":[{"_id":"c1","name":"Suits","isActive":true},42]}"#).unwrap();
        assert_eq!(categories.categories.len(), 1);
    }

    #[test]
    fn test_null_list_reads_as_empty() {
        let list: ProductList = serde_json::from_str(r#"{"success":true,"data":null}"#).unwrap();
        assert!(list.into_products().is_empty());
    }

    #[test]
    fn test_missing_envelope_fields_default_to_empty() {
        let categories: CategoryList = serde_json::from_str("{}").unwrap();
        assert!(categories.categories.is_empty());

        let results: SearchResults = serde_json::from_str(r#"{"count":0}"#).unwrap();
        assert!(results.products.is_empty());
    }

    #[test]
    fn test_contact_form_missing_field() {
        let mut form = ContactForm {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            message: "  ".to_string(),
        };
        assert_eq!(form.missing_field(), Some("message"));

        form.message = "Where is my order?".to_string();
        assert_eq!(form.missing_field(), None);

        let body = serde_json::to_value(&form).unwrap();
        assert!(body.get("phone").is_none());
    }
}
