//! HTTP+JSON surface over the ledger service.
//!
//! Routes:
//! - `GET  /api/health`       liveness probe (`/api/test` is an alias)
//! - `POST /api/transaction`  create an entry from structured fields
//! - `GET  /api/transaction`  all entries, most recent first
//! - `GET  /api/balance`      balance with income and expense totals

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::{AppError, LedgerService};
use crate::domain::{Entry, LedgerSummary, NewEntry};

/// Shared application state. The service is the explicit store handle.
#[derive(Clone)]
struct AppState {
    service: Arc<LedgerService>,
}

/// Error body returned to API clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

/// Maps failures onto HTTP responses.
enum ApiError {
    /// The request body could not be read as a create-entry request.
    InvalidBody(String),
    /// The service rejected or failed the operation.
    App(AppError, &'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidBody(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    reason: Some("invalid-body"),
                    field: None,
                },
            ),
            ApiError::App(AppError::Validation(err), _) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: err.to_string(),
                    reason: Some(err.reason()),
                    field: Some(err.field()),
                },
            ),
            ApiError::App(AppError::Parse(err), _) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: err.to_string(),
                    reason: Some("invalid-format"),
                    field: None,
                },
            ),
            // Store details stay in the logs.
            ApiError::App(AppError::Store(_), message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: message.to_string(),
                    reason: None,
                    field: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Build the router for the given service.
pub fn router(service: Arc<LedgerService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/test", get(health_check))
        .route("/api/transaction", get(list_entries).post(create_entry))
        .route("/api/balance", get(balance))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until Ctrl-C is received.
pub async fn serve(service: Arc<LedgerService>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    service.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check() -> Json<&'static str> {
    Json("ok")
}

async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<NewEntry>, JsonRejection>,
) -> Result<Json<Entry>, ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        tracing::warn!("rejected request body: {}", rejection.body_text());
        ApiError::InvalidBody(rejection.body_text())
    })?;

    let entry = state
        .service
        .append_entry(input)
        .await
        .map_err(|err| ApiError::App(err, "Failed to create transaction"))?;

    Ok(Json(entry))
}

async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<Entry>>, ApiError> {
    let entries = state
        .service
        .list_entries()
        .await
        .map_err(|err| ApiError::App(err, "Failed to fetch transactions"))?;

    Ok(Json(entries))
}

async fn balance(State(state): State<AppState>) -> Result<Json<LedgerSummary>, ApiError> {
    let summary = state
        .service
        .summary()
        .await
        .map_err(|err| ApiError::App(err, "Failed to compute balance"))?;

    Ok(Json(summary))
}
