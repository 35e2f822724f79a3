//! Integration test harness for Navdana.
//!
//! [`FakeApi`] serves an in-process imitation of the Navdana REST API on
//! `127.0.0.1:0` so the real `reqwest`-based clients can be driven end to
//! end. It records every request it sees and can be told to fail or stall
//! specific calls.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p navdana-integration-tests
//! ```
//!
//! # Fake accounts
//!
//! - Any email receives the code [`VALID_OTP`].
//! - [`ADMIN_EMAIL`] signs in as `admin`; every other email as `customer`.
//! - Admin endpoints answer `403` unless the bearer token belongs to an admin.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use navdana_core::User;
use navdana_storefront::api::ApiClient;
use navdana_storefront::config::StorefrontConfig;
use navdana_storefront::session::SessionStore;
use navdana_storefront::state::AppState;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Code accepted by `POST /user/verify`.
pub const VALID_OTP: &str = "123456";

/// Email that signs in with the admin role.
pub const ADMIN_EMAIL: &str = "admin@navdana.com";

/// A request seen by the fake API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, without the `/api/v1` prefix.
    pub uri: String,
    pub authorization: Option<String>,
}

/// A body posted to one of the write endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBody {
    pub uri: String,
    pub body: Value,
}

#[derive(Default)]
struct FakeState {
    requests: Vec<RecordedRequest>,
    bodies: Vec<RecordedBody>,
    categories: Vec<Value>,
    products: Vec<Value>,
    users: Vec<Value>,
    contacts: Vec<Value>,
    subscribers: Vec<Value>,
    tokens: HashMap<String, String>,
    search_delays: HashMap<String, Duration>,
    fail_send_otp: bool,
    fail_catalog: bool,
}

type Shared = Arc<Mutex<FakeState>>;

fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running fake of the remote API.
pub struct FakeApi {
    base_url: String,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeApi {
    /// Start the fake with the default catalog fixture.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            categories: fixture_categories(),
            products: fixture_products(),
            users: vec![
                json!({"_id": "u-admin", "name": "Store Admin", "email": ADMIN_EMAIL, "role": "admin"}),
                json!({"_id": "u-meera", "name": "Meera", "email": "meera@example.com", "role": "customer", "phoneNumber": "9845012345"}),
                json!({"_id": "u-legacy", "email": "ops@navdana.com", "role": "manager"}),
            ],
            contacts: vec![
                json!({"_id": "m1", "name": "Ravi", "email": "ravi@example.com", "message": "Do you ship to Pune?"}),
                json!({"_id": "m2", "name": "Asha", "email": "asha@example.com", "phone": "98860", "message": "Exchange for size L"}),
            ],
            subscribers: vec![json!({"_id": "s1", "email": "first@example.com"})],
            ..FakeState::default()
        }));

        let api = Router::new()
            .route("/category", get(categories))
            .route("/product", get(products))
            .route("/product/search", get(search))
            .route("/product/category/{id}", get(products_by_category))
            .route("/user/send-otp", post(send_otp))
            .route("/user/verify", post(verify))
            .route("/user", get(list_users).post(create_user))
            .route("/user/{id}", put(update_user))
            .route("/contact", get(list_contacts).post(create_contact))
            .route("/contact/{id}", axum::routing::delete(delete_contact))
            .route("/subscribe", get(list_subscribers).post(create_subscriber))
            .route("/subscribe/send-mail", post(send_mail))
            .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
            .with_state(Arc::clone(&state));
        let app = Router::new().nest("/api/v1", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake API listener");
        let addr = listener.local_addr().expect("fake API address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}/api/v1"),
            state,
            server,
        }
    }

    /// API base URL, including `/api/v1`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configuration pointing at this fake.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected, which would be a harness bug.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::with_api_base(&self.base_url).expect("fake API base URL")
    }

    /// Application state over this fake with an in-memory session.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        self.app_state_with(SessionStore::in_memory())
    }

    /// Application state over this fake with the given session.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn app_state_with(&self, session: SessionStore) -> AppState {
        let config = self.config();
        let api = ApiClient::new(&config).expect("API client");
        AppState::from_parts(config, api, session)
    }

    /// Every request seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Requests whose path starts with `prefix`.
    #[must_use]
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.uri.starts_with(prefix))
            .collect()
    }

    /// Bodies posted to write endpoints, oldest first.
    #[must_use]
    pub fn bodies(&self) -> Vec<RecordedBody> {
        lock(&self.state).bodies.clone()
    }

    /// Current subscriber records.
    #[must_use]
    pub fn subscribers(&self) -> Vec<Value> {
        lock(&self.state).subscribers.clone()
    }

    /// Make searches for `keyword` take `delay`.
    pub fn delay_search(&self, keyword: &str, delay: Duration) {
        lock(&self.state)
            .search_delays
            .insert(keyword.to_string(), delay);
    }

    /// Make `POST /user/send-otp` answer 500.
    pub fn fail_send_otp(&self, fail: bool) {
        lock(&self.state).fail_send_otp = fail;
    }

    /// Make every catalog endpoint answer 503.
    pub fn fail_catalog(&self, fail: bool) {
        lock(&self.state).fail_catalog = fail;
    }
}

/// Run the OTP login for `email` against the fake and return the user.
///
/// # Panics
///
/// Panics if any step of the login fails.
pub async fn sign_in(state: &AppState, email: &str) -> User {
    let mut flow = state.auth_flow();
    flow.begin().expect("open login prompt");
    flow.request_otp(email).await.expect("request OTP");
    flow.verify_otp(email, VALID_OTP)
        .await
        .expect("verify OTP")
        .clone()
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn fixture_categories() -> Vec<Value> {
    vec![
        json!({"_id": "c-suits", "name": "Suit Sets", "isActive": true}),
        json!({"_id": "c-all", "name": "All Products", "isActive": true}),
        json!({"_id": "c-velvet", "name": "Velvet Edit", "isActive": true, "image": "https://cdn.navdana.com/velvet.jpg"}),
        json!({"_id": "c-old", "name": "Monsoon 2022", "isActive": false}),
        json!({"_id": "c-bad", "name": "Broken", "isActive": true}),
    ]
}

fn fixture_products() -> Vec<Value> {
    vec![
        json!({
            "_id": "p-silk", "name": "Silk Suit Set", "price": 3499, "strikePrice": 4999,
            "category": {"_id": "c-suits"},
            "variant": [{"_id": "v-silk-m", "size": "M", "stock": 5}, {"_id": "v-silk-l", "size": "L", "stock": 0}]
        }),
        json!({
            "_id": "p-velvet", "name": "Velvet Kurta", "price": 2599,
            "category": {"_id": "c-velvet"},
            "variant": [{"_id": "v-velvet-s", "size": "S", "stock": 2}]
        }),
        json!({
            "_id": "p-cotton", "name": "Cotton Suit Set", "price": 1899,
            "category": {"_id": "c-suits"},
            "variant": [{"_id": "v-cotton-m", "size": "M", "stock": 9, "price": 1999}]
        }),
        // Unpriced draft, as the API returns while a product is being edited.
        json!({"_id": "p-draft", "name": "Velvet Draft", "category": {"_id": "c-velvet"}}),
    ]
}

// =============================================================================
// Handlers
// =============================================================================

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let uri = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), ToString::to_string);
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        uri,
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    };
    lock(&state).requests.push(recorded);
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

fn catalog_down(state: &Shared) -> Option<Response> {
    lock(state)
        .fail_catalog
        .then(|| error(StatusCode::SERVICE_UNAVAILABLE, "catalog offline"))
}

async fn categories(State(state): State<Shared>) -> Response {
    if let Some(down) = catalog_down(&state) {
        return down;
    }
    let categories = lock(&state).categories.clone();
    Json(json!({"success": true, "categories": categories})).into_response()
}

async fn products(State(state): State<Shared>) -> Response {
    if let Some(down) = catalog_down(&state) {
        return down;
    }
    let products = lock(&state).products.clone();
    Json(json!({"success": true, "data": products})).into_response()
}

async fn products_by_category(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    if let Some(down) = catalog_down(&state) {
        return down;
    }
    let products: Vec<Value> = lock(&state)
        .products
        .iter()
        .filter(|p| p["category"]["_id"] == id.as_str())
        .cloned()
        .collect();
    let success = id != "c-bad";
    Json(json!({"success": success, "data": products})).into_response()
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    keyword: String,
}

async fn search(State(state): State<Shared>, Query(query): Query<SearchQuery>) -> Response {
    if let Some(down) = catalog_down(&state) {
        return down;
    }
    let delay = lock(&state).search_delays.get(&query.keyword).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let needle = query.keyword.to_lowercase();
    let products: Vec<Value> = lock(&state)
        .products
        .iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();
    Json(json!({"products": products})).into_response()
}

#[derive(Deserialize)]
struct OtpRequest {
    email: String,
    #[serde(default)]
    otp: String,
}

async fn send_otp(State(state): State<Shared>, Json(body): Json<OtpRequest>) -> Response {
    if lock(&state).fail_send_otp {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "mailer unavailable");
    }
    if body.email.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Email is required");
    }
    Json(json!({"success": true, "message": "OTP sent"})).into_response()
}

async fn verify(State(state): State<Shared>, Json(body): Json<OtpRequest>) -> Response {
    if body.otp != VALID_OTP {
        return error(StatusCode::UNAUTHORIZED, "Invalid or expired OTP");
    }

    let mut state = lock(&state);
    let user = state
        .users
        .iter()
        .find(|u| u["email"] == body.email.as_str())
        .cloned()
        .unwrap_or_else(|| {
            json!({"_id": format!("u-{}", body.email), "email": body.email, "role": "customer"})
        });
    let token = format!("token-{}", body.email);
    state.tokens.insert(token.clone(), body.email.clone());

    Json(json!({"success": true, "user": user, "token": token})).into_response()
}

/// `Some(response)` when the caller is not a signed-in admin.
fn reject_non_admin(state: &FakeState, headers: &HeaderMap) -> Option<Response> {
    let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return Some(error(StatusCode::UNAUTHORIZED, "No token provided"));
    };

    let is_admin = state
        .tokens
        .get(token)
        .and_then(|email| state.users.iter().find(|u| u["email"] == email.as_str()))
        .is_some_and(|u| u["role"] == "admin");

    (!is_admin).then(|| error(StatusCode::FORBIDDEN, "Admin access required"))
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Some(rejected) = reject_non_admin(&state, &headers) {
        return rejected;
    }
    Json(json!({"success": true, "users": state.users})).into_response()
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Some(rejected) = reject_non_admin(&state, &headers) {
        return rejected;
    }
    if state.users.iter().any(|u| u["email"] == body["email"]) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "User already exists"})),
        )
            .into_response();
    }

    let mut user = body.clone();
    user["_id"] = json!(format!("u-{}", state.users.len() + 1));
    state.users.push(user.clone());
    state.bodies.push(RecordedBody {
        uri: "/user".to_string(),
        body,
    });
    (StatusCode::CREATED, Json(json!({"success": true, "user": user}))).into_response()
}

async fn update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Some(rejected) = reject_non_admin(&state, &headers) {
        return rejected;
    }
    let Some(user) = state.users.iter_mut().find(|u| u["_id"] == id.as_str()) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    if let (Some(user), Some(changes)) = (user.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            user.insert(key.clone(), value.clone());
        }
    }
    state.bodies.push(RecordedBody {
        uri: format!("/user/{id}"),
        body,
    });
    Json(json!({"success": true})).into_response()
}

async fn list_contacts(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Some(rejected) = reject_non_admin(&state, &headers) {
        return rejected;
    }
    Json(Value::Array(state.contacts.clone())).into_response()
}

async fn create_contact(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = lock(&state);
    let mut contact = body.clone();
    contact["_id"] = json!(format!("m{}", state.contacts.len() + 1));
    state.contacts.push(contact);
    state.bodies.push(RecordedBody {
        uri: "/contact".to_string(),
        body,
    });
    (StatusCode::CREATED, Json(json!({"success": true}))).into_response()
}

async fn delete_contact(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = lock(&state);
    if let Some(rejected) = reject_non_admin(&state, &headers) {
        return rejected;
    }
    let before = state.contacts.len();
    state.contacts.retain(|c| c["_id"] != id.as_str());
    if state.contacts.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Contact not found"})),
        )
            .into_response();
    }
    Json(json!({"success": true})).into_response()
}

async fn list_subscribers(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Some(rejected) = reject_non_admin(&state, &headers) {
        return rejected;
    }
    Json(json!({"success": true, "subscribers": state.subscribers})).into_response()
}

async fn create_subscriber(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = lock(&state);
    if state.subscribers.iter().any(|s| s["email"] == body["email"]) {
        return error(StatusCode::CONFLICT, "Already subscribed");
    }
    let id = format!("s{}", state.subscribers.len() + 1);
    state
        .subscribers
        .push(json!({"_id": id, "email": body["email"]}));
    (StatusCode::CREATED, Json(json!({"success": true}))).into_response()
}

async fn send_mail(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Some(rejected) = reject_non_admin(&state, &headers) {
        return rejected;
    }
    state.bodies.push(RecordedBody {
        uri: "/subscribe/send-mail".to_string(),
        body,
    });
    Json(json!({"success": true, "sent": state.subscribers.len()})).into_response()
}
