//! Shared fixtures: an in-process mock of the UnBind API and recording
//! implementations of the UI ports.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use reqwest::Url;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use unbind_client::adapters::{HttpBackend, MemoryTokenStore};
use unbind_client::app::AppState;
use unbind_client::config::Config;
use unbind_core::domain::Token;
use unbind_core::ports::{Navigator, Notifier, TokenStore};

pub const VALID_TOKEN: &str = "tok-123";
pub const PASSWORD: &str = "correct-horse";

//=========================================================================================
// Mock Backend
//=========================================================================================

#[derive(Default)]
pub struct MockState {
    pub requests: AtomicUsize,
    pub fail_documents: AtomicBool,
    pub upload_delay_ms: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// (file name, content type) per upload, in arrival order.
    pub uploads: Mutex<Vec<(String, String)>>,
    pub attempts_per_file: Mutex<HashMap<String, usize>>,
}

impl MockState {
    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploads.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }
}

pub struct MockServer {
    pub url: Url,
    pub state: Arc<MockState>,
}

impl MockServer {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/me", get(me))
            .route("/api/v1/users/profile", put(update_profile))
            .route("/api/v1/documents", get(list_documents))
            .route("/api/v1/documents/upload", post(upload))
            .route("/api/v1/documents/{id}", get(get_document))
            .route("/api/v1/documents/{id}/analyze", post(analyze))
            .route("/api/v1/documents/{id}/analysis", get(analyses))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: Url::parse(&format!("http://{}", addr)).unwrap(),
            state,
        }
    }

    pub fn set_upload_delay(&self, delay: Duration) {
        self.state
            .upload_delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }
}

/// A base URL on which nothing is listening.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", VALID_TOKEN);
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(expected.as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Could not validate credentials" })),
    )
        .into_response()
}

fn user_json(first_name: &str, last_name: &str) -> Value {
    json!({
        "id": 1,
        "email": "jane@example.com",
        "first_name": first_name,
        "last_name": last_name,
        "is_active": true,
        "is_verified": false,
        "created_at": "2024-01-05T15:04:00.123456",
        "updated_at": null
    })
}

fn document_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "filename": format!("{}.pdf", id),
        "original_filename": format!("lease-{}.pdf", id),
        "file_path": format!("./uploads/{}.pdf", id),
        "file_size": 2048,
        "mime_type": "application/pdf",
        "status": status,
        "created_at": "2024-03-10T12:00:00Z",
        "analyses": []
    })
}

fn analysis_json(id: i64, document_id: i64) -> Value {
    json!({
        "id": id,
        "document_id": document_id,
        "analysis_type": "summary",
        "original_text": "The lessee shall indemnify the lessor...",
        "simplified_text": "You pay for damage you cause.",
        "analysis_data": { "risks": ["indemnity"] },
        "confidence_score": 87,
        "processing_time": 1200,
        "created_at": "2024-03-11T09:30:00"
    })
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if body["password"] == PASSWORD {
        Json(json!({ "access_token": VALID_TOKEN, "token_type": "bearer", "expires_in": 3600 }))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect email or password" })),
        )
            .into_response()
    }
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(user_json("Jane", "Doe")).into_response()
}

async fn update_profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    let first = body["first_name"].as_str().unwrap_or("Jane");
    let last = body["last_name"].as_str().unwrap_or("Doe");
    Json(user_json(first, last)).into_response()
}

async fn list_documents(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    if state.fail_documents.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    Json(json!([
        document_json(1, "uploaded"),
        document_json(2, "uploaded"),
        document_json(3, "analyzed"),
        document_json(4, "processing"),
        document_json(5, "error"),
    ]))
    .into_response()
}

async fn get_document(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    if id > 5 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Document not found" })),
        )
            .into_response();
    }
    Json(document_json(id, "processing")).into_response()
}

async fn analyze(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    if id > 5 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Document not found" })),
        )
            .into_response();
    }
    Json(analysis_json(10, id)).into_response()
}

async fn analyses(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([analysis_json(10, id), analysis_json(11, id)])).into_response()
}

/// File names drive the outcome:
/// `reject*` -> 400 with a detail, `broken*` -> 500 without JSON,
/// `missing*` -> 404 with a detail, `gone*` -> 404 without a body,
/// `flaky*` -> 503 on the first try and 200 afterwards, anything else -> 200.
async fn upload(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }

    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(current, Ordering::SeqCst);

    let mut received = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let _ = field.bytes().await.unwrap();
            received = Some((name, content_type));
        }
    }

    let delay = state.upload_delay_ms.load(Ordering::SeqCst) as u64;
    tokio::time::sleep(Duration::from_millis(delay)).await;
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    let Some((name, content_type)) = received else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "file"], "msg": "field required" }] })),
        )
            .into_response();
    };
    state.uploads.lock().unwrap().push((name.clone(), content_type));
    let tries = {
        let mut per_file = state.attempts_per_file.lock().unwrap();
        let count = per_file.entry(name.clone()).or_insert(0);
        *count += 1;
        *count
    };

    if name.starts_with("reject") {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "File type not allowed" })),
        )
            .into_response()
    } else if name.starts_with("missing") {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Upload folder not found" })),
        )
            .into_response()
    } else if name.starts_with("gone") {
        StatusCode::NOT_FOUND.into_response()
    } else if name.starts_with("broken") {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
    } else if name.starts_with("flaky") && tries == 1 {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "detail": "Storage busy" })),
        )
            .into_response()
    } else {
        Json(document_json(42, "uploaded")).into_response()
    }
}

//=========================================================================================
// Recording UI Ports
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.events.lock().unwrap().push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.events.lock().unwrap().push(Notification::Error(message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.redirects.lock().unwrap().push(path.to_string());
    }
}

//=========================================================================================
// Harness
//=========================================================================================

pub struct Harness {
    pub state: AppState,
    pub tokens: Arc<MemoryTokenStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    /// Client state against `url`, optionally already holding `token`.
    pub fn new(url: Url, token: Option<&str>) -> Self {
        let tokens = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(Token::new(t)),
            None => MemoryTokenStore::new(),
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let backend = Arc::new(HttpBackend::new(reqwest::Client::new(), url.clone()));

        let state = AppState::new(
            Arc::new(Config::for_base_url(url)),
            backend,
            tokens.clone(),
            notifier.clone(),
            navigator.clone(),
        );
        Self {
            state,
            tokens,
            notifier,
            navigator,
        }
    }

    pub fn stored_token(&self) -> Option<Token> {
        self.tokens.load().unwrap()
    }
}
