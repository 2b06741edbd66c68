//! Test utilities for bookkeeper-core
//!
//! This module provides a mock Bookkeeper API server backed by a
//! [`MockBackend`], so the HTTP client can be exercised end to end without
//! the real backend.

use std::net::SocketAddr;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::api::{FinanceApi, MockBackend};
use crate::error::Error;
use crate::models::{flexible_date, TransactionPatch};

/// Mock Bookkeeper API server for testing and development
pub struct MockApiServer {
    addr: SocketAddr,
    backend: MockBackend,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockApiServer {
    /// Start the mock server on an available port
    pub async fn start(backend: MockBackend) -> Self {
        let app = Router::new()
            .route("/api/v1/categories", get(handle_categories))
            .route("/api/v1/transactions", get(handle_transactions))
            .route("/api/v1/transactions/unclassified", get(handle_unclassified))
            .route("/api/v1/transactions/hidden", get(handle_hidden))
            .route("/api/v1/transactions/csv", post(handle_csv))
            .route(
                "/api/v1/transaction/:id",
                get(handle_get_transaction).patch(handle_patch_transaction),
            )
            .route("/api/v1/interval/fiscal-month", get(handle_fiscal_month))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            backend,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The backend serving requests, for seeding and assertions
    pub fn backend(&self) -> &MockBackend {
        &self.backend
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Error body in the backend's `{"error": "..."}` shape
struct ApiError(StatusCode, String);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidData(_) | Error::Csv(_) => StatusCode::BAD_REQUEST,
            Error::Api { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match err {
            Error::Api { message, .. } => message,
            other => other.to_string(),
        };
        ApiError(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError(StatusCode::BAD_REQUEST, message.into())
}

#[derive(Debug, Deserialize)]
struct IntervalQuery {
    from: String,
    to: String,
    category: Option<i64>,
}

impl IntervalQuery {
    fn dates(&self) -> Result<(chrono::NaiveDate, chrono::NaiveDate), ApiError> {
        let from = flexible_date::parse(&self.from).map_err(bad_request)?;
        let to = flexible_date::parse(&self.to).map_err(bad_request)?;
        Ok((from, to))
    }
}

#[derive(Debug, Deserialize)]
struct FiscalMonthQuery {
    month: u32,
    year: i32,
    income_category_id: i64,
}

async fn handle_categories(State(backend): State<MockBackend>) -> Result<Response, ApiError> {
    Ok(Json(backend.list_categories().await?).into_response())
}

async fn handle_transactions(
    State(backend): State<MockBackend>,
    Query(query): Query<IntervalQuery>,
) -> Result<Response, ApiError> {
    let (from, to) = query.dates()?;
    let list = match query.category {
        Some(id) => backend.list_transactions_for_category(from, to, id).await?,
        None => backend.list_transactions(from, to).await?,
    };
    Ok(Json(list).into_response())
}

async fn handle_unclassified(
    State(backend): State<MockBackend>,
    Query(query): Query<IntervalQuery>,
) -> Result<Response, ApiError> {
    let (from, to) = query.dates()?;
    Ok(Json(backend.list_unclassified(from, to).await?).into_response())
}

async fn handle_hidden(
    State(backend): State<MockBackend>,
    Query(query): Query<IntervalQuery>,
) -> Result<Response, ApiError> {
    let (from, to) = query.dates()?;
    Ok(Json(backend.list_hidden(from, to).await?).into_response())
}

async fn handle_csv(
    State(backend): State<MockBackend>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("statement.csv").to_string();
        let bytes = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
        backend.upload_csv(&file_name, bytes.to_vec()).await?;
        return Ok((StatusCode::CREATED, Json(serde_json::json!({}))).into_response());
    }
    Err(bad_request("missing multipart field 'file'"))
}

async fn handle_get_transaction(
    State(backend): State<MockBackend>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    Ok(Json(backend.get_transaction(id).await?).into_response())
}

async fn handle_patch_transaction(
    State(backend): State<MockBackend>,
    Path(id): Path<i64>,
    Json(patch): Json<TransactionPatch>,
) -> Result<Response, ApiError> {
    Ok(Json(backend.patch_transaction(id, &patch).await?).into_response())
}

async fn handle_fiscal_month(
    State(backend): State<MockBackend>,
    Query(query): Query<FiscalMonthQuery>,
) -> Result<Response, ApiError> {
    let fiscal_month = backend
        .fiscal_month(query.month, query.year, query.income_category_id)
        .await?;
    Ok(Json(fiscal_month).into_response())
}
