//! Krapper HTTP read API.
//!
//! Routes:
//! * `GET /api/v1/wraps`: the catalog
//! * `GET /api/v1/wraps/{name}`: one resolved wrap
//! * `GET /api/v1/resources/{name}`: cluster objects the wrap is bound to

#![forbid(unsafe_code)]

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use krapper_kubehub::{ListError, ResourceLister};
use krapper_store::WrapStore;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<WrapStore>,
    /// Absent when no cluster connection could be made at startup.
    pub lister: Option<Arc<dyn ResourceLister>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("wrap '{0}' not found")]
    UnknownWrap(String),
    #[error("no cluster connection configured")]
    NoCluster,
    #[error(transparent)]
    List(#[from] ListError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownWrap(_) => StatusCode::NOT_FOUND,
            ApiError::NoCluster => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::List(ListError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::List(ListError::InvalidGroupVersion(_)) => StatusCode::BAD_REQUEST,
            ApiError::List(ListError::ListFailure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        } else {
            debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/wraps", get(list_wraps))
        .route("/api/v1/wraps/{name}", get(get_wrap))
        .route("/api/v1/resources/{name}", get(list_resources))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: impl Future<Output = ()> + Send + 'static) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "http api listening");
    }
    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await
}

pub async fn list_wraps(State(state): State<AppState>) -> Response {
    metrics::counter!("krapper_api_requests_total", 1, "route" => "wraps");
    let catalog = state.store.catalog();
    Json(&*catalog).into_response()
}

pub async fn get_wrap(State(state): State<AppState>, Path(name): Path<String>) -> Result<Response, ApiError> {
    metrics::counter!("krapper_api_requests_total", 1, "route" => "wrap");
    let wrap = state.store.wrap(&name).ok_or(ApiError::UnknownWrap(name))?;
    Ok(Json(&*wrap).into_response())
}

pub async fn list_resources(State(state): State<AppState>, Path(name): Path<String>) -> Result<Response, ApiError> {
    metrics::counter!("krapper_api_requests_total", 1, "route" => "resources");
    let wrap = state.store.wrap(&name).ok_or(ApiError::UnknownWrap(name))?;
    let lister = state.lister.as_ref().ok_or(ApiError::NoCluster)?;
    let source = &wrap.source;
    let items = lister
        .list_resources(&source.api_version, &source.kind, source.effective_namespace(), &source.selector)
        .await?;
    debug!(wrap = %wrap.name, count = items.len(), "resources served");
    Ok(Json(items).into_response())
}
