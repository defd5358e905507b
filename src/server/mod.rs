//! HTTP API over a [`Wiki`].
//!
//! Handlers run wiki operations on the blocking thread pool while holding the
//! wiki mutex, so overlapping requests are applied one after another.
//!
//! Request spans are children of the span that was current when the
//! [`AppState`] was built, and blocking work re-enters the request span.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::constants::MAX_REQUEST_BODY_BYTES;
use crate::errors::{AppError, AppResult};
use crate::wiki::Wiki;
use axum::extract::{DefaultBodyLimit, Request};
use axum::routing::{delete, get, post};
use axum::Router;
use std::io;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, Span};

/// Shared handler state: the single writer for the data directory.
#[derive(Clone)]
pub struct AppState {
    wiki: Arc<Mutex<Wiki>>,
    span: Span,
}

impl AppState {
    /// Wraps `wiki`, adopting the current span as the parent of request spans.
    pub fn new(wiki: Wiki) -> Self {
        Self {
            wiki: Arc::new(Mutex::new(wiki)),
            span: Span::current(),
        }
    }

    /// Runs `op` against the wiki on the blocking pool, holding the lock for
    /// the whole operation.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Wiki) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let wiki = Arc::clone(&self.wiki);
        let current = Span::current();
        let span = if current.is_none() {
            self.span.clone()
        } else {
            current
        };
        let joined = tokio::task::spawn_blocking(move || {
            span.in_scope(|| {
                let guard = wiki.lock().unwrap_or_else(|e| e.into_inner());
                op(&guard)
            })
        })
        .await;

        match joined {
            Ok(result) => result.map_err(ApiError::from),
            Err(e) => {
                error!(error = %e, "Wiki operation panicked");
                Err(ApiError::Internal("Internal error while handling request".to_string()))
            }
        }
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    let parent = state.span.clone();
    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request| {
        info_span!(
            parent: &parent,
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Router::new()
        .route(
            "/api/data",
            get(handlers::load_data).post(handlers::save_data),
        )
        .route("/api/backups", get(handlers::list_backups))
        .route("/api/backups/manual", post(handlers::manual_backup))
        .route("/api/backups/:filename", delete(handlers::delete_backup))
        .route("/api/restore/:filename", post(handlers::restore_backup))
        .route("/api/merge/:filename", post(handlers::merge_backup))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(trace)
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        AppError::Io(io::Error::new(
            e.kind(),
            format!("Failed to bind {}: {}", addr, e),
        ))
    })?;
    info!(address = %addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
