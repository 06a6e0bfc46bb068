//! Integration tests for the clinic admin client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p clinic-integration-tests
//! ```
//!
//! The tests run the real client against [`StubBackend`], an in-process
//! axum server bound to an ephemeral port. The stub serves scripted replies
//! per path (JSON, or raw text to simulate a broken backend or proxy) and
//! records every request it receives, so tests can
//! assert on exactly which calls were made, with which token header and
//! body.
//!
//! # Test Categories
//!
//! - `admin_sync` - Admin fetches and mutation-then-refresh actions
//! - `doctor_sync` - Doctor profile, appointments and dashboard
//! - `session` - Login, persistence and the token-change effect

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use clinic_admin::AppState;
use clinic_admin::api::BackendClient;
use clinic_admin::config::ClientConfig;
use clinic_admin::session::{SessionStore, TokenStorage};
use clinic_admin_core::Role;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// A request received by the stub backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    /// Value of the `aToken` header, if sent.
    pub admin_token: Option<String>,
    /// Value of the `dToken` header, if sent.
    pub doctor_token: Option<String>,
    /// Parsed JSON body, when the body was JSON.
    pub json: Option<Value>,
    /// Raw body, lossily decoded (multipart bodies end up here).
    pub raw_body: String,
}

/// A scripted reply.
#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    /// A non-JSON body, served as `text/html`.
    Raw(StatusCode, String),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::Json(body) => Json(body).into_response(),
            Self::Raw(status, text) => {
                (status, [(header::CONTENT_TYPE, "text/html")], text).into_response()
            }
        }
    }
}

#[derive(Default)]
struct StubState {
    scripts: HashMap<String, VecDeque<Reply>>,
    requests: Vec<RecordedRequest>,
}

/// In-process stand-in for the clinic backend.
#[derive(Clone)]
pub struct StubBackend {
    base_url: Url,
    state: Arc<Mutex<StubState>>,
}

impl StubBackend {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(Mutex::new(StubState::default()));
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let base_url = Url::parse(&format!("http://{addr}/"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base_url, state })
    }

    /// Base URL the client should be pointed at.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Queue a response for `path`. Responses are served in order; the last
    /// one keeps being served once the queue is down to it.
    pub fn respond(&self, path: &str, body: Value) {
        self.script(path, Reply::Json(body));
    }

    /// Queue a non-JSON reply for `path`, such as a proxy error page.
    pub fn respond_raw(&self, path: &str, status: StatusCode, text: &str) {
        self.script(path, Reply::Raw(status, text.to_string()));
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests received for one path.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|request| request.path == path)
            .cloned()
            .collect()
    }

    /// Number of requests received for one path.
    #[must_use]
    pub fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }

    /// Client configuration pointing at this stub.
    #[must_use]
    pub fn config(&self, session_file: &Path) -> ClientConfig {
        let mut config = ClientConfig::for_backend(self.base_url(), session_file.to_path_buf());
        config.http_timeout = Duration::from_secs(5);
        config
    }

    /// Application state talking to this stub, with `role` already signed
    /// in with `token` and the session persisted under `dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the client or session store cannot be set up.
    pub async fn signed_in(
        &self,
        dir: &Path,
        role: Role,
        token: &str,
    ) -> Result<AppState, clinic_admin::Error> {
        let config = self.config(&dir.join("session.json"));
        let client = BackendClient::new(&config)?;
        let session = SessionStore::load(TokenStorage::new(config.session_file.clone())).await?;
        session.set_token(role, SecretString::from(token)).await?;
        Ok(AppState::with_parts(config, client, session))
    }

    fn script(&self, path: &str, reply: Reply) {
        self.lock()
            .scripts
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn handle(
    State(state): State<Arc<Mutex<StubState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    let header_value = |name: &str| {
        headers
            .get(name.to_ascii_lowercase())
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let path = uri.path().to_string();

    let request = RecordedRequest {
        method,
        path: path.clone(),
        admin_token: header_value(Role::Admin.header_name()),
        doctor_token: header_value(Role::Doctor.header_name()),
        json: serde_json::from_slice(&body).ok(),
        raw_body: String::from_utf8_lossy(&body).into_owned(),
    };

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    state.requests.push(request);

    let response = match state.scripts.get_mut(&path) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
    };
    response.unwrap_or_else(|| {
        Reply::Json(json!({ "success": false, "message": format!("no stub for {path}") }))
    })
}

/// A base URL nothing is listening on.
///
/// # Errors
///
/// Returns error if a port cannot be reserved.
pub async fn closed_port_url() -> std::io::Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Url::parse(&format!("http://{addr}/"))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
