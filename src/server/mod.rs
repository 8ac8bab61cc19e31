//! Scrape endpoint
//!
//! `/metrics` renders a fresh snapshot per request and `/health` is a plain
//! liveness probe. Everything else is a bare 404.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::signal;

use crate::api::FleetClient;
use crate::error::ExporterError;
use crate::metrics::{self, EXPOSITION_CONTENT_TYPE};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub fleet: Arc<FleetClient>,
}

impl AppState {
    pub fn new(fleet: FleetClient) -> Self {
        Self {
            fleet: Arc::new(fleet),
        }
    }
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        tracing::error!("Error fetching metrics: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Error: {}\n", self),
        )
            .into_response()
    }
}

/// Create the router. No request tracing layer: scrapes are too frequent to
/// be worth logging individually.
///
/// Only GET is served. axum answers HEAD with the GET handler unless a HEAD
/// handler is set, so HEAD is routed to the 404 explicitly.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/metrics",
            get(metrics_handler).head(not_found).fallback(not_found),
        )
        .route(
            "/health",
            get(health_check).head(not_found).fallback(not_found),
        )
        .fallback(not_found)
        .with_state(state)
}

async fn metrics_handler(State(state): State<AppState>) -> Result<Response, ExporterError> {
    let snapshot = state.fleet.fetch_snapshot().await?;
    let body = metrics::render(&snapshot).to_string();

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        body,
    )
        .into_response())
}

async fn health_check() -> &'static str {
    "ok"
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Bind and serve until SIGINT/SIGTERM.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
