//! Admin request and response bodies.
//!
//! The dashboard endpoints were written at different times and do not agree
//! on an envelope, so each list response accepts every shape the API has
//! been seen to send.

use navdana_core::{ContactMessage, Role, Subscriber, User};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// `GET /user`: `{data: [...]}`, `{users: [...]}` or a bare array.
///
/// Any other body reads as no users.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserList {
    Data { data: Vec<User> },
    Users { users: Vec<User> },
    Bare(Vec<User>),
    Other(IgnoredAny),
}

impl UserList {
    #[must_use]
    pub fn into_vec(self) -> Vec<User> {
        match self {
            Self::Data { data } => data,
            Self::Users { users } => users,
            Self::Bare(users) => users,
            Self::Other(_) => Vec::new(),
        }
    }
}

/// `GET /contact`: `{data: [...]}` or a bare array.
///
/// Any other body reads as no messages.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContactList {
    Data { data: Vec<ContactMessage> },
    Bare(Vec<ContactMessage>),
    Other(IgnoredAny),
}

impl ContactList {
    #[must_use]
    pub fn into_vec(self) -> Vec<ContactMessage> {
        match self {
            Self::Data { data } => data,
            Self::Bare(contacts) => contacts,
            Self::Other(_) => Vec::new(),
        }
    }
}

/// `GET /subscribe`: `{data: [...]}` or `{subscribers: [...]}`.
///
/// Anything else reads as no subscribers.
#[derive(Debug, Default, Deserialize)]
pub struct SubscriberList {
    #[serde(default)]
    data: Option<Vec<Subscriber>>,
    #[serde(default)]
    subscribers: Option<Vec<Subscriber>>,
}

impl SubscriberList {
    #[must_use]
    pub fn into_vec(self) -> Vec<Subscriber> {
        self.data.or(self.subscribers).unwrap_or_default()
    }
}

/// The user create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Date of birth as typed (`YYYY-MM-DD`).
    pub dob: String,
    pub phone_number: String,
    pub role: Role,
}

impl UserForm {
    /// Pre-fill the form for editing an existing user.
    ///
    /// The password is never known client-side and starts blank.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone().unwrap_or_default(),
            email: user.email.clone(),
            password: String::new(),
            dob: user.dob.clone().unwrap_or_default(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            role: user.role,
        }
    }

    /// Body for `POST /user`. Blank DOB and phone number are left out.
    #[must_use]
    pub fn create_body(&self) -> UserPayload<'_> {
        UserPayload {
            password: Some(&self.password),
            ..self.base_payload()
        }
    }

    /// Body for `PUT /user/:id`. A blank password keeps the current one.
    #[must_use]
    pub fn update_body(&self) -> UserPayload<'_> {
        UserPayload {
            password: non_blank(&self.password),
            ..self.base_payload()
        }
    }

    fn base_payload(&self) -> UserPayload<'_> {
        UserPayload {
            name: self.name.trim(),
            email: self.email.trim(),
            password: None,
            dob: non_blank(&self.dob),
            phone_number: non_blank(&self.phone_number),
            role: self.role,
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Serialized user form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload<'a> {
    pub name: &'a str,
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    #[serde(rename = "DOB", skip_serializing_if = "Option::is_none")]
    pub dob: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<&'a str>,
    pub role: Role,
}

/// `POST /subscribe/send-mail`
#[derive(Debug, Serialize)]
pub struct MailRequest<'a> {
    pub message: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    const USER: &str = r#"{"_id":"u1","email":"a@navdana.com","role":"admin"}"#;

    #[test]
    fn test_user_list_accepts_every_envelope() {
        for body in [
            format!(r#"{{"data":[{USER}]}}"#),
            format!(r#"{{"success":true,"users":[{USER}]}}"#),
            format!("[{USER}]"),
        ] {
            let users = serde_json::from_str::<UserList>(&body).unwrap().into_vec();
            assert_eq!(users.len(), 1, "body: {body}");
            assert_eq!(users[0].role, Role::Admin);
        }
    }

    #[test]
    fn test_unrecognized_list_bodies_read_as_empty() {
        for body in [
            r#"{"success":true,"message":"No users yet"}"#,
            r#"{"data":null}"#,
            "null",
        ] {
            let users = serde_json::from_str::<UserList>(body).unwrap().into_vec();
            assert!(users.is_empty(), "body: {body}");
            let contacts = serde_json::from_str::<ContactList>(body).unwrap().into_vec();
            assert!(contacts.is_empty(), "body: {body}");
        }
    }

    #[test]
    fn test_contact_list_envelopes() {
        let contact = r#"{"_id":"c1","name":"Ravi","email":"r@x.in","message":"Hi"}"#;
        let wrapped: ContactList = serde_json::from_str(&format!(r#"{{"data":[{contact}]}}"#)).unwrap();
        let bare: ContactList = serde_json::from_str(&format!("[{contact}]")).unwrap();
        assert_eq!(wrapped.into_vec(), bare.into_vec());
    }

    #[test]
    fn test_subscriber_list_envelopes() {
        let sub = r#"{"_id":"s1","email":"s@x.in"}"#;
        let data: SubscriberList = serde_json::from_str(&format!(r#"{{"data":[{sub}]}}"#)).unwrap();
        let named: SubscriberList =
            serde_json::from_str(&format!(r#"{{"subscribers":[{sub}]}}"#)).unwrap();
        let neither: SubscriberList = serde_json::from_str(r#"{"success":true}"#).unwrap();

        assert_eq!(data.into_vec().len(), 1);
        assert_eq!(named.into_vec().len(), 1);
        assert!(neither.into_vec().is_empty());
    }

    #[test]
    fn test_update_body_omits_blank_fields() {
        let form = UserForm {
            name: "Nisha".to_string(),
            email: "nisha@navdana.com".to_string(),
            role: Role::Customer,
            ..UserForm::default()
        };

        assert_eq!(
            serde_json::to_value(form.update_body()).unwrap(),
            json!({"name": "Nisha", "email": "nisha@navdana.com", "role": "customer"})
        );
        assert_eq!(
            serde_json::to_value(form.create_body()).unwrap(),
            json!({"name": "Nisha", "email": "nisha@navdana.com", "password": "", "role": "customer"})
        );
    }

    #[test]
    fn test_update_body_keeps_filled_fields() {
        let form = UserForm {
            name: "Nisha".to_string(),
            email: "nisha@navdana.com".to_string(),
            password: "s3cret".to_string(),
            dob: "1994-03-02".to_string(),
            phone_number: "9876543210".to_string(),
            role: Role::Admin,
        };

        let body = serde_json::to_value(form.update_body()).unwrap();
        assert_eq!(body["password"], "s3cret");
        assert_eq!(body["DOB"], "1994-03-02");
        assert_eq!(body["phoneNumber"], "9876543210");
        assert_eq!(body["role"], "admin");
    }
}
