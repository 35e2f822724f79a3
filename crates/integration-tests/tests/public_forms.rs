//! Contact form and newsletter signup against the fake API.

#![allow(clippy::unwrap_used)]

use navdana_integration_tests::FakeApi;
use navdana_storefront::api::{ApiError, ContactForm};
use navdana_storefront::error::AppError;
use serde_json::json;

#[tokio::test]
async fn test_contact_form_is_posted() {
    let api = FakeApi::start().await;
    let state = api.app_state();

    let form = ContactForm {
        name: "Ravi".to_string(),
        email: "ravi@example.com".to_string(),
        phone: None,
        message: "Is the silk set dry clean only?".to_string(),
    };
    assert!(form.missing_field().is_none());
    state.api().submit_contact(&form).await.unwrap();

    let body = api.bodies().into_iter().find(|b| b.uri == "/contact").unwrap().body;
    assert_eq!(body["name"], "Ravi");
    assert_eq!(body["message"], "Is the silk set dry clean only?");
    assert!(api.requests_to("/contact").iter().all(|r| r.authorization.is_none()));
}

#[tokio::test]
async fn test_subscribe_adds_email() {
    let api = FakeApi::start().await;
    let state = api.app_state();

    state.api().subscribe("new@example.com").await.unwrap();
    assert!(api.subscribers().contains(&json!({"_id": "s2", "email": "new@example.com"})));
}

#[tokio::test]
async fn test_duplicate_subscription_reports_api_message() {
    let api = FakeApi::start().await;
    let state = api.app_state();

    let err = state.api().subscribe("first@example.com").await.unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 409, .. }));

    let err = AppError::from(err);
    assert!(!err.is_reportable());
    assert_eq!(err.user_message(), "Already subscribed");
}

#[tokio::test]
async fn test_server_error_is_reportable_with_generic_message() {
    let api = FakeApi::start().await;
    api.fail_send_otp(true);
    let state = api.app_state();

    let err = AppError::from(state.api().send_otp("meera@example.com").await.unwrap_err());
    assert!(err.is_reportable());
    assert_ne!(err.user_message(), "mailer unavailable");
}
