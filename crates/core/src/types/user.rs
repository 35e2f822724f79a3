//! User record as returned by the remote API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Role, UserId};

/// A storefront or dashboard account.
///
/// Created by the remote API on OTP verification and stored verbatim in the
/// session store. Fields the storefront never reads are optional so that a
/// partial record from an older API version still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Remote document ID.
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Login email address.
    pub email: String,
    /// Access role.
    #[serde(default)]
    pub role: Role,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Date of birth, as sent by the API.
    #[serde(default, rename = "DOB", skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    /// Order references; only the count is displayed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<serde_json::Value>,
    /// When the account was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name to greet the user with, falling back to the email local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }

    /// Whether this user holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}
