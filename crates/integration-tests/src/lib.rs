//! Integration test support for shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! Tests talk to [`FakeApi`], an in-process axum server that mimics the
//! product and account endpoints, so no network access is needed.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use shopfront::api::ApiClient;
use shopfront::config::ApiConfig;
use shopfront::state::Storefront;
use shopfront::storage::Storage;
use tokio::task::JoinHandle;
use url::Url;

/// Username accepted by the fake login endpoint.
pub const USERNAME: &str = "mor_2314";
/// Password accepted by the fake login endpoint.
pub const PASSWORD: &str = "83r5^_";
/// Token returned on successful login.
pub const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.fake";

#[derive(Default)]
struct FakeState {
    product_requests: AtomicUsize,
    failures_left: AtomicUsize,
    login_requests: AtomicUsize,
}

/// In-process stand-in for the upstream product and account API.
pub struct FakeApi {
    addr: SocketAddr,
    state: Arc<FakeState>,
    server: JoinHandle<()>,
}

impl FakeApi {
    /// Start the server on an ephemeral local port.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/products", get(products))
            .route("/auth/login", post(login))
            .route("/users", post(register))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// API root of the running server.
    ///
    /// # Panics
    ///
    /// Never in practice; a bound socket address always forms a valid URL.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    /// Client configuration with short retry delays.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            retry_delay: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
            ..ApiConfig::new(self.base_url())
        }
    }

    /// A client pointed at this server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_config()).unwrap()
    }

    /// A storefront on `storage` backed by this server, with no checkout delay.
    #[must_use]
    pub fn storefront(&self, storage: Arc<dyn Storage>) -> Storefront {
        Storefront::new(storage, self.client(), Duration::ZERO)
    }

    /// Answer the next `count` product requests with 503.
    pub fn fail_next_product_requests(&self, count: usize) {
        self.state.failures_left.store(count, Ordering::SeqCst);
    }

    /// Product list requests received so far.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }

    /// Login requests received so far.
    #[must_use]
    pub fn login_requests(&self) -> usize {
        self.state.login_requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// The fake catalog.
#[must_use]
pub fn catalog() -> Value {
    json!([
        {
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack",
            "price": 109.95,
            "description": "Fits 15 inch laptops",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg"
        },
        {
            "id": 2,
            "title": "Mens Casual Premium Slim Fit T-Shirts",
            "price": 22.3,
            "category": "men's clothing"
        },
        {
            "id": 5,
            "title": "John Hardy Women's Legends Naga Bracelet",
            "price": 695,
            "category": "jewelery"
        }
    ])
}

async fn products(State(state): State<Arc<FakeState>>) -> Response {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    let failing = state
        .failures_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream busy").into_response();
    }
    Json(catalog()).into_response()
}

async fn login(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.login_requests.fetch_add(1, Ordering::SeqCst);
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        Json(json!({ "token": TOKEN })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "username or password is incorrect").into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"].as_str().is_none_or(str::is_empty) {
        return (StatusCode::BAD_REQUEST, "email required").into_response();
    }
    Json(json!({ "id": 11 })).into_response()
}
