//! # REST API
//!
//! Builds the axum router that exposes the ledger over HTTP. All endpoints
//! share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                          | Description                     |
//! |--------|-------------------------------|---------------------------------|
//! | GET    | `/health`                     | Liveness probe                  |
//! | POST   | `/login`                      | Resolve credentials to a user id |
//! | POST   | `/add_transaction`            | Record a borrow or lend entry   |
//! | PATCH  | `/mark_paid/:transaction_id`  | Settle a transaction            |
//! | GET    | `/get_transactions/:user_id`  | All entries for a user          |
//! | GET    | `/credit_score/:user_id`      | Integer credit score            |
//!
//! Errors are returned as `{"error": "..."}` with a status derived from the
//! ledger's error kind. Nothing is cached.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use peerledger::account::AccountId;
use peerledger::transaction::{Transaction, TransactionDraft, TransactionStatus, TransactionType};
use peerledger::{ErrorKind, LedgerError, LedgerService};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// The ledger core.
    pub service: Arc<LedgerService>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(login_handler))
        .route("/add_transaction", post(add_transaction_handler))
        .route("/mark_paid/:transaction_id", patch(mark_paid_handler))
        .route("/get_transactions/:user_id", get(get_transactions_handler))
        .route("/credit_score/:user_id", get(credit_score_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// An account id as clients send it: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(AccountId),
    Text(String),
}

impl IdInput {
    fn resolve(&self, field: &str) -> Result<AccountId, LedgerError> {
        match self {
            IdInput::Number(id) => Ok(*id),
            IdInput::Text(text) => parse_account_id(text, field),
        }
    }
}

fn parse_account_id(raw: &str, field: &str) -> Result<AccountId, LedgerError> {
    raw.trim()
        .parse()
        .map_err(|_| LedgerError::Validation(format!("{field} must be a numeric account id")))
}

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /add_transaction`.
///
/// Required fields are optional here so that a missing one is reported by
/// name instead of as a generic deserialization failure.
#[derive(Debug, Deserialize)]
pub struct AddTransactionRequest {
    pub user_id: Option<IdInput>,
    pub transaction_type: Option<TransactionType>,
    pub transaction_amount: Option<f64>,
    pub transaction_status: Option<TransactionStatus>,
    #[serde(default, alias = "transaction_with_userid")]
    pub transaction_with: Option<IdInput>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AddTransactionRequest {
    fn into_draft(self) -> Result<TransactionDraft, LedgerError> {
        Ok(TransactionDraft {
            user_id: self.user_id.map(|id| id.resolve("user_id")).transpose()?,
            kind: self.transaction_type,
            amount: self.transaction_amount,
            status: self.transaction_status,
            counterparty: self
                .transaction_with
                .map(|id| id.resolve("transaction_with"))
                .transpose()?,
            reason: self.reason,
        })
    }
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `POST /login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: AccountId,
    pub msg: String,
}

/// A transaction as serialized to clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction_id: Uuid,
    pub user_id: AccountId,
    pub transaction_type: TransactionType,
    pub transaction_amount: f64,
    pub transaction_date: DateTime<Utc>,
    pub transaction_status: TransactionStatus,
    pub transaction_with_userid: Option<AccountId>,
    pub reason: Option<String>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            transaction_id: tx.id,
            user_id: tx.user_id,
            transaction_type: tx.kind,
            transaction_amount: tx.amount,
            transaction_date: tx.timestamp,
            transaction_status: tx.status,
            transaction_with_userid: tx.counterparty,
            reason: tx.reason,
        }
    }
}

/// Response payload for `GET /credit_score/:user_id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreditScoreResponse {
    pub credit_score: u32,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// A ledger operation failed.
    Ledger(LedgerError),
    /// The request body could not be parsed.
    BadRequest(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::EmptyResult => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::InsufficientData => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Ledger(LedgerError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, "Unauthorised".to_string())
            }
            ApiError::Ledger(err) => (status_for(err.kind()), err.public_message()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: always returns 200 with the node version.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "version": state.version })),
    )
}

/// `POST /login`: checks credentials on the blocking pool.
async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let _timer = state
        .metrics
        .request_latency_seconds
        .with_label_values(&["login"])
        .start_timer();
    let Json(req) = payload?;

    let service = Arc::clone(&state.service);
    let outcome = tokio::task::spawn_blocking(move || service.authenticate(&req.username, &req.password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "login task failed");
            LedgerError::Storage("login task failed".into())
        })?;

    match outcome {
        Ok(user_id) => {
            state.metrics.logins_total.inc();
            Ok(Json(LoginResponse {
                user_id,
                msg: "Login Successful".to_string(),
            }))
        }
        Err(err) => {
            if err.kind() == ErrorKind::Unauthorized {
                state.metrics.login_failures_total.inc();
            }
            Err(err.into())
        }
    }
}

/// `POST /add_transaction`: records a new entry.
async fn add_transaction_handler(
    State(state): State<AppState>,
    payload: Result<Json<AddTransactionRequest>, JsonRejection>,
) -> ApiResult<TransactionResponse> {
    let _timer = state
        .metrics
        .request_latency_seconds
        .with_label_values(&["add_transaction"])
        .start_timer();
    let Json(req) = payload?;

    let tx = state.service.create_transaction(req.into_draft()?)?;
    state.metrics.transactions_created_total.inc();
    Ok(Json(tx.into()))
}

/// `PATCH /mark_paid/:transaction_id`: settles an entry. Repeat calls
/// succeed.
async fn mark_paid_handler(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> ApiResult<TransactionResponse> {
    let _timer = state
        .metrics
        .request_latency_seconds
        .with_label_values(&["mark_paid"])
        .start_timer();

    // A malformed id cannot name a stored transaction.
    let id = Uuid::parse_str(&transaction_id)
        .map_err(|_| LedgerError::NotFound(format!("transaction {transaction_id}")))?;

    let tx = state.service.mark_paid(&id)?;
    state.metrics.settlements_total.inc();
    Ok(Json(tx.into()))
}

/// `GET /get_transactions/:user_id`: all entries for a user. An empty
/// history is a 400.
async fn get_transactions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<TransactionResponse>> {
    let _timer = state
        .metrics
        .request_latency_seconds
        .with_label_values(&["get_transactions"])
        .start_timer();
    let user_id = parse_account_id(&user_id, "user_id")?;

    let records = state.service.list_transactions(user_id)?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// `GET /credit_score/:user_id`: 422 when the user has no volume.
async fn credit_score_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<CreditScoreResponse> {
    let _timer = state
        .metrics
        .request_latency_seconds
        .with_label_values(&["credit_score"])
        .start_timer();
    let user_id = parse_account_id(&user_id, "user_id")?;

    state.metrics.score_requests_total.inc();
    let credit_score = state.service.compute_credit_score(user_id)?;
    Ok(Json(CreditScoreResponse { credit_score }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use peerledger::config::LedgerConfig;
    use peerledger::storage::LedgerDb;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Creates a test AppState backed by a temporary database.
    fn test_app_state() -> AppState {
        let config = LedgerConfig {
            flush_on_write: false,
            ..LedgerConfig::default()
        };
        let db = LedgerDb::open_temporary().expect("temp db");
        AppState {
            version: "0.1.0-test".into(),
            service: Arc::new(LedgerService::new(db, &config)),
            metrics: Arc::new(crate::metrics::NodeMetrics::new().expect("metrics")),
        }
    }

    /// Sends a request and returns (status, parsed JSON body).
    async fn send(router: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    async fn add(router: &Router, body: Value) -> (StatusCode, Value) {
        send(router, "POST", "/add_transaction", Some(body)).await
    }

    fn entry(user_id: u64, kind: &str, amount: f64) -> Value {
        json!({
            "user_id": user_id,
            "transaction_type": kind,
            "transaction_amount": amount,
            "transaction_status": "Unpaid",
            "transaction_with": 99,
            "reason": "test"
        })
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let router = create_router(test_app_state());
        let (status, body) = send(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], "0.1.0-test");
    }

    #[tokio::test]
    async fn login_succeeds_with_valid_credentials() {
        let state = test_app_state();
        let account = state.service.accounts().create("rachit", "rachit123", 0.0).unwrap();
        let router = create_router(state.clone());

        let (status, body) = send(
            &router,
            "POST",
            "/login",
            Some(json!({ "username": "rachit", "password": "rachit123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["msg"], "Login Successful");
        assert_eq!(body["user_id"], account.id);
        assert_eq!(state.metrics.logins_total.get(), 1);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let state = test_app_state();
        state.service.accounts().create("rachit", "rachit123", 0.0).unwrap();
        let router = create_router(state.clone());

        let (wrong_status, wrong_body) = send(
            &router,
            "POST",
            "/login",
            Some(json!({ "username": "rachit", "password": "wrong-password" })),
        )
        .await;
        let (unknown_status, unknown_body) = send(
            &router,
            "POST",
            "/login",
            Some(json!({ "username": "nobody", "password": "rachit123" })),
        )
        .await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body, unknown_body);
        assert_eq!(wrong_body, json!({ "error": "Unauthorised" }));
        assert_eq!(state.metrics.login_failures_total.get(), 2);
    }

    #[tokio::test]
    async fn login_with_malformed_body_is_bad_request() {
        let router = create_router(test_app_state());
        let (status, body) = send(&router, "POST", "/login", Some(json!({ "username": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn add_transaction_returns_record() {
        let state = test_app_state();
        let router = create_router(state.clone());

        let (status, body) = add(&router, entry(1, "B", 300.0)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 1);
        assert_eq!(body["transaction_type"], "B");
        assert_eq!(body["transaction_amount"], 300.0);
        assert_eq!(body["transaction_status"], "Unpaid");
        assert_eq!(body["transaction_with_userid"], 99);
        assert_eq!(body["reason"], "test");
        assert!(body["transaction_id"].as_str().is_some());
        assert!(body["transaction_date"].as_str().is_some());
        assert_eq!(state.metrics.transactions_created_total.get(), 1);
    }

    #[tokio::test]
    async fn add_transaction_accepts_string_ids_and_omitted_optionals() {
        let router = create_router(test_app_state());
        let (status, body) = add(
            &router,
            json!({
                "user_id": "7",
                "transaction_type": "L",
                "transaction_amount": 12.5,
                "transaction_status": "Paid"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 7);
        assert_eq!(body["transaction_status"], "Paid");
        assert!(body["transaction_with_userid"].is_null());
        assert!(body["reason"].is_null());
    }

    #[tokio::test]
    async fn add_transaction_names_missing_field() {
        let router = create_router(test_app_state());
        let (status, body) = add(
            &router,
            json!({ "user_id": 1, "transaction_type": "B", "transaction_status": "Unpaid" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("transaction_amount"));
    }

    #[tokio::test]
    async fn add_transaction_rejects_unknown_type() {
        let router = create_router(test_app_state());
        let (status, _) = add(&router, entry(1, "X", 1.0)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = add(
            &router,
            json!({
                "user_id": "abc",
                "transaction_type": "B",
                "transaction_amount": 1.0,
                "transaction_status": "Unpaid"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn mark_paid_is_idempotent() {
        let state = test_app_state();
        let router = create_router(state.clone());
        let (_, created) = add(&router, entry(1, "L", 40.0)).await;
        let path = format!("/mark_paid/{}", created["transaction_id"].as_str().unwrap());

        let (first_status, first) = send(&router, "PATCH", &path, None).await;
        let (second_status, second) = send(&router, "PATCH", &path, None).await;
        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(first["transaction_status"], "Paid");
        assert_eq!(first, second);
        assert_eq!(state.metrics.settlements_total.get(), 2);
    }

    #[tokio::test]
    async fn mark_paid_unknown_is_not_found() {
        let router = create_router(test_app_state());
        let (status, _) = send(&router, "PATCH", &format!("/mark_paid/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, "PATCH", "/mark_paid/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_transactions_lists_user_entries() {
        let router = create_router(test_app_state());
        add(&router, entry(3, "B", 1.0)).await;
        add(&router, entry(3, "L", 2.0)).await;
        add(&router, entry(4, "L", 5.0)).await;

        let (status, body) = send(&router, "GET", "/get_transactions/3", None).await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|t| t["user_id"] == 3));
    }

    #[tokio::test]
    async fn get_transactions_empty_is_bad_request() {
        let router = create_router(test_app_state());
        let (status, body) = send(&router, "GET", "/get_transactions/12", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(&router, "GET", "/get_transactions/alice", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn credit_score_for_thirty_seventy_split() {
        let state = test_app_state();
        let router = create_router(state.clone());
        add(&router, entry(5, "B", 300.0)).await;
        add(&router, entry(5, "L", -700.0)).await;

        let (status, body) = send(&router, "GET", "/credit_score/5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "credit_score": 2500 }));
        assert_eq!(state.metrics.score_requests_total.get(), 1);
    }

    #[tokio::test]
    async fn credit_score_without_history_is_unprocessable() {
        let router = create_router(test_app_state());
        let (status, body) = send(&router, "GET", "/credit_score/8", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("insufficient data"));
    }

    #[test]
    fn storage_errors_hide_details() {
        let resp = ApiError::from(LedgerError::Storage("sled: /srv/db corrupted".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
