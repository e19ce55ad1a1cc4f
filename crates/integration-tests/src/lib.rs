//! Integration tests for Lapak.
//!
//! The tests drive the real `ApiClient`, cart container and checkout against
//! [`FakeApi`], an in-process `axum` server on an ephemeral port that speaks
//! the store API's JSON and records what it received.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lapak-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use lapak_core::{NewOrder, Order, OrderId, OrderStatus, Product, ProductDraft, ProductId, Role};
use lapak_storefront::config::{ApiConfig, MessagingConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

type Reply = (StatusCode, Json<Value>);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn reply(status: StatusCode, body: impl serde::Serialize) -> Reply {
    (status, Json(json!(body)))
}

/// A registered account.
#[derive(Debug, Clone)]
pub struct Account {
    pub name: String,
    pub password: String,
    pub role: Role,
}

/// Everything the fake server knows and has seen.
#[derive(Debug, Default)]
pub struct FakeState {
    products: Mutex<Vec<Product>>,
    orders: Mutex<Vec<Order>>,
    accounts: Mutex<HashMap<String, Account>>,
    order_ids: Mutex<VecDeque<String>>,
    received_orders: Mutex<Vec<Value>>,
    authorization: Mutex<Vec<Option<String>>>,
    fail_orders: AtomicBool,
    both_id_keys: AtomicBool,
    garble_order_replies: AtomicBool,
    next_id: AtomicUsize,
}

impl FakeState {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}{n:08x}")
    }

    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        lock(&self.authorization).push(value);
    }
}

/// Handle to a running fake API.
#[derive(Debug, Clone)]
pub struct FakeApi {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeApi {
    /// Start a server on `127.0.0.1` with an OS-assigned port.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::default());
        let router = Router::new()
            .route("/products", get(list_products).post(create_product))
            .route("/products/{id}", put(update_product).delete(delete_product))
            .route("/orders", get(list_orders).post(create_order))
            .route("/orders/{id}", patch(update_order))
            .route("/login", post(login))
            .route("/register", post(register))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake API");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, state }
    }

    /// Base URL of the server.
    ///
    /// # Panics
    ///
    /// Never in practice: the address always forms a valid URL.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("valid socket URL")
    }

    /// API configuration pointing at this server.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.url())
    }

    /// Add a product directly, bypassing the API.
    pub fn insert_product(&self, product: Product) {
        lock(&self.state.products).push(product);
    }

    /// Add an order directly, bypassing the API.
    pub fn insert_order(&self, order: Order) {
        lock(&self.state.orders).push(order);
    }

    /// Add an account directly.
    pub fn insert_account(&self, phone: &str, account: Account) {
        lock(&self.state.accounts).insert(phone.to_string(), account);
    }

    /// Use `id` for the next created order.
    pub fn queue_order_id(&self, id: &str) {
        lock(&self.state.order_ids).push_back(id.to_string());
    }

    /// Make `POST /orders` answer 503 (or work again with `false`).
    pub fn fail_orders(&self, fail: bool) {
        self.state.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Send records with both `_id` and `id` (or only `_id` with `false`).
    pub fn send_both_id_keys(&self, both: bool) {
        self.state.both_id_keys.store(both, Ordering::SeqCst);
    }

    /// Store created orders but answer `POST /orders` with a body that is not
    /// an order.
    pub fn garble_order_replies(&self, garble: bool) {
        self.state.garble_order_replies.store(garble, Ordering::SeqCst);
    }

    /// Raw JSON bodies received by `POST /orders`, including rejected ones.
    #[must_use]
    pub fn received_orders(&self) -> Vec<Value> {
        lock(&self.state.received_orders).clone()
    }

    /// Orders currently stored.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.state.orders).clone()
    }

    /// Products currently stored.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.state.products).clone()
    }

    /// `Authorization` header of each `GET`/`POST /products` request, in order.
    #[must_use]
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        lock(&self.state.authorization).clone()
    }
}

/// Messaging settings for tests.
///
/// # Panics
///
/// Never in practice: the number is a valid constant.
#[allow(clippy::expect_used)]
#[must_use]
pub fn messaging() -> MessagingConfig {
    MessagingConfig {
        scheme: "whatsapp".to_string(),
        merchant_phone: "6281234567890".parse().expect("valid phone"),
        open_command: "true".to_string(),
    }
}

/// A product fixture.
#[must_use]
pub fn product(id: &str, name: &str, price: u64, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: lapak_core::Price::new(price),
        image: "https://via.placeholder.com/300".to_string(),
        description: String::new(),
        category: category.to_string(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_products(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Reply {
    state.record_auth(&headers);
    reply(StatusCode::OK, &*lock(&state.products))
}

/// Created records are returned with `_id`, the way the document store sends
/// them, and optionally with a virtual `id` alongside.
fn with_underscore_id(state: &FakeState, record: &impl serde::Serialize) -> Value {
    let keep_plain = state.both_id_keys.load(Ordering::SeqCst);
    let mut value = json!(record);
    if let Some(obj) = value.as_object_mut()
        && let Some(id) = obj.get("id").cloned()
    {
        if !keep_plain {
            obj.remove("id");
        }
        obj.insert("_id".to_string(), id);
    }
    value
}

async fn create_product(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(draft): Json<ProductDraft>,
) -> Reply {
    state.record_auth(&headers);
    let product = Product {
        id: ProductId::new(state.next_id("p")),
        name: draft.name,
        price: draft.price,
        image: draft.image,
        description: draft.description,
        category: draft.category,
    };
    let body = with_underscore_id(&state, &product);
    lock(&state.products).push(product);
    (StatusCode::CREATED, Json(body))
}

async fn update_product(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> Reply {
    let mut products = lock(&state.products);
    let Some(product) = products.iter_mut().find(|p| p.id.as_str() == id) else {
        return reply(StatusCode::NOT_FOUND, json!({ "message": "product not found" }));
    };
    product.name = draft.name;
    product.price = draft.price;
    product.image = draft.image;
    product.description = draft.description;
    product.category = draft.category;
    reply(StatusCode::OK, with_underscore_id(&state, &*product))
}

async fn delete_product(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> Reply {
    let mut products = lock(&state.products);
    let before = products.len();
    products.retain(|p| p.id.as_str() != id);
    if products.len() == before {
        reply(StatusCode::NOT_FOUND, json!({ "message": "product not found" }))
    } else {
        reply(StatusCode::OK, json!({ "message": "deleted" }))
    }
}

async fn list_orders(State(state): State<Arc<FakeState>>) -> Reply {
    reply(StatusCode::OK, &*lock(&state.orders))
}

async fn create_order(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Reply {
    lock(&state.received_orders).push(body.clone());

    if state.fail_orders.load(Ordering::SeqCst) {
        return reply(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "message": "database unavailable" }),
        );
    }

    let new_order: NewOrder = match serde_json::from_value(body) {
        Ok(order) => order,
        Err(e) => return reply(StatusCode::BAD_REQUEST, json!({ "message": e.to_string() })),
    };
    let id = lock(&state.order_ids)
        .pop_front()
        .unwrap_or_else(|| state.next_id("o"));

    let order = Order {
        id: OrderId::new(id),
        customer_name: new_order.customer_name,
        items: new_order.items,
        total_price: new_order.total_price,
        status: new_order.status,
        created_at: None,
    };
    let body = with_underscore_id(&state, &order);
    lock(&state.orders).push(order);
    if state.garble_order_replies.load(Ordering::SeqCst) {
        return reply(StatusCode::CREATED, "OK");
    }
    (StatusCode::CREATED, Json(body))
}

#[derive(Deserialize)]
struct StatusUpdate {
    status: OrderStatus,
}

async fn update_order(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Reply {
    let mut orders = lock(&state.orders);
    let Some(order) = orders.iter_mut().find(|o| o.id.as_str() == id) else {
        return reply(StatusCode::NOT_FOUND, json!({ "message": "order not found" }));
    };
    order.status = update.status;
    reply(StatusCode::OK, &*order)
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    name: String,
    phone: String,
    password: String,
}

fn auth_body(phone: &str, account: &Account) -> Value {
    json!({
        "user": { "name": account.name, "phone": phone, "role": account.role },
        "token": format!("token-{phone}"),
    })
}

async fn login(State(state): State<Arc<FakeState>>, Json(creds): Json<Credentials>) -> Reply {
    let accounts = lock(&state.accounts);
    match accounts.get(&creds.phone) {
        Some(account) if account.password == creds.password => {
            (StatusCode::OK, Json(auth_body(&creds.phone, account)))
        }
        _ => reply(StatusCode::UNAUTHORIZED, json!({ "message": "invalid credentials" })),
    }
}

async fn register(State(state): State<Arc<FakeState>>, Json(creds): Json<Credentials>) -> Reply {
    let mut accounts = lock(&state.accounts);
    if accounts.contains_key(&creds.phone) {
        return reply(StatusCode::CONFLICT, json!({ "message": "phone already registered" }));
    }
    let account = Account {
        name: creds.name,
        password: creds.password,
        role: Role::Customer,
    };
    let body = auth_body(&creds.phone, &account);
    accounts.insert(creds.phone, account);
    (StatusCode::CREATED, Json(body))
}
