//! Dashboard client against the fake API.

#![allow(clippy::unwrap_used)]

use navdana_admin::{AdminClient, AdminError, UserForm};
use navdana_core::{ContactId, Role, UserId};
use navdana_integration_tests::{ADMIN_EMAIL, FakeApi, sign_in};
use navdana_storefront::state::AppState;
use serde_json::json;

async fn admin_client(api: &FakeApi) -> (AppState, AdminClient) {
    let state = api.app_state();
    sign_in(&state, ADMIN_EMAIL).await;
    let client = AdminClient::from_session(state.config(), state.session()).unwrap();
    (state, client)
}

fn new_user() -> UserForm {
    UserForm {
        name: "Kavya".to_string(),
        email: "kavya@navdana.com".to_string(),
        password: "s3cret".to_string(),
        role: Role::Admin,
        ..UserForm::default()
    }
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let api = FakeApi::start().await;
    let (_state, client) = admin_client(&api).await;

    client.list_users().await.unwrap();

    let request = api.requests_to("/user").into_iter().find(|r| r.method == "GET").unwrap();
    assert_eq!(
        request.authorization.as_deref(),
        Some("Bearer token-admin@navdana.com")
    );
}

#[tokio::test]
async fn test_list_users_keeps_unknown_roles() {
    let api = FakeApi::start().await;
    let (_state, client) = admin_client(&api).await;

    let users = client.list_users().await.unwrap();
    assert_eq!(users.len(), 3);
    let legacy = users.iter().find(|u| u.email == "ops@navdana.com").unwrap();
    assert_eq!(legacy.role, Role::Other);
    assert!(legacy.name.is_none());
}

#[tokio::test]
async fn test_customer_token_is_refused() {
    let api = FakeApi::start().await;
    let state = api.app_state();
    sign_in(&state, "meera@example.com").await;
    let client = AdminClient::from_session(state.config(), state.session()).unwrap();

    let err = client.list_users().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.user_message(), "Admin access required");
}

#[tokio::test]
async fn test_create_user_omits_blank_optional_fields() {
    let api = FakeApi::start().await;
    let (_state, client) = admin_client(&api).await;

    client.create_user(&new_user()).await.unwrap();

    let body = api.bodies().into_iter().find(|b| b.uri == "/user").unwrap().body;
    assert_eq!(
        body,
        json!({
            "name": "Kavya",
            "email": "kavya@navdana.com",
            "password": "s3cret",
            "role": "admin"
        })
    );
}

#[tokio::test]
async fn test_duplicate_user_surfaces_error_field() {
    let api = FakeApi::start().await;
    let (_state, client) = admin_client(&api).await;

    let form = UserForm {
        email: "meera@example.com".to_string(),
        ..new_user()
    };
    let err = client.create_user(&form).await.unwrap_err();
    assert!(matches!(err, AdminError::Api { status: 409, .. }));
    assert_eq!(err.user_message(), "User already exists");
}

#[tokio::test]
async fn test_update_without_password_keeps_it() {
    let api = FakeApi::start().await;
    let (_state, client) = admin_client(&api).await;

    let form = UserForm {
        name: "Meera Iyer".to_string(),
        email: "meera@example.com".to_string(),
        phone_number: "9845012345".to_string(),
        dob: "1994-08-15".to_string(),
        ..UserForm::default()
    };
    client.update_user(&UserId::new("u-meera"), &form).await.unwrap();

    let body = api
        .bodies()
        .into_iter()
        .find(|b| b.uri == "/user/u-meera")
        .unwrap()
        .body;
    assert!(body.get("password").is_none());
    assert_eq!(body["DOB"], "1994-08-15");
    assert_eq!(body["phoneNumber"], "9845012345");
    assert_eq!(body["role"], "customer");
}

#[tokio::test]
async fn test_update_unknown_user_reports_message() {
    let api = FakeApi::start().await;
    let (_state, client) = admin_client(&api).await;

    let err = client
        .update_user(&UserId::new("u-missing"), &new_user())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "User not found");
}

#[tokio::test]
async fn test_contacts_list_and_delete() {
    let api = FakeApi::start().await;
    let (_state, client) = admin_client(&api).await;

    let contacts = client.list_contacts().await.unwrap();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts.get(1).unwrap().phone.as_deref(), Some("98860"));

    client.delete_contact(&ContactId::new("m1")).await.unwrap();
    let remaining = client.list_contacts().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining.first().unwrap().id.as_str(), "m2");

    let err = client.delete_contact(&ContactId::new("m1")).await.unwrap_err();
    assert_eq!(err.user_message(), "Contact not found");
}

#[tokio::test]
async fn test_subscribers_and_mailing() {
    let api = FakeApi::start().await;
    let (state, client) = admin_client(&api).await;
    state.api().subscribe("second@example.com").await.unwrap();

    let subscribers = client.list_subscribers().await.unwrap();
    let emails: Vec<&str> = subscribers.iter().map(|s| s.email.as_str()).collect();
    assert_eq!(emails, ["first@example.com", "second@example.com"]);

    client.send_mail("  Festive drop is live  ").await.unwrap();
    let body = api
        .bodies()
        .into_iter()
        .find(|b| b.uri == "/subscribe/send-mail")
        .unwrap()
        .body;
    assert_eq!(body, json!({"message": "Festive drop is live"}));
}

#[tokio::test]
async fn test_unreachable_api_uses_default_message() {
    let api = FakeApi::start().await;
    let (state, _client) = admin_client(&api).await;
    let token = state.session().token().unwrap();
    let base = api.base_url().to_string();
    drop(api);

    // Give the aborted server a moment to release the port.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let config = navdana_storefront::config::StorefrontConfig::with_api_base(&base).unwrap();
    let client = AdminClient::new(&config, &token).unwrap();

    let err = client.list_contacts().await.unwrap_err();
    assert!(matches!(err, AdminError::Http { .. }));
    assert_eq!(err.user_message(), "Failed to load contacts");
}
