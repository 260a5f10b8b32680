//! Pagecopy Server - content copy API
//!
//! HTTP server exposing the copy-translated-content endpoints.

pub mod auth;
pub mod http;

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use pagecopy_core::{PagePermissions, SqliteStore};

/// Shared application state
pub struct AppState {
    /// The rusqlite connection is not Sync; the mutex serializes store access,
    /// which also keeps each copy batch strictly sequential.
    pub store: Mutex<SqliteStore>,
    pub policy: PagePermissions,
}

impl AppState {
    /// In-memory store (development and tests)
    pub fn new() -> pagecopy_core::Result<Self> {
        Ok(Self {
            store: Mutex::new(SqliteStore::in_memory()?),
            policy: PagePermissions,
        })
    }

    /// Store backed by a database file
    pub fn with_database(path: impl AsRef<Path>) -> pagecopy_core::Result<Self> {
        Ok(Self {
            store: Mutex::new(SqliteStore::new(path)?),
            policy: PagePermissions,
        })
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/copy-translated-content/get-elements",
            get(http::get_elements_query).post(http::get_elements_body),
        )
        .route("/copy-translated-content/copy", post(http::copy_elements))
        .route("/status", get(http::get_status))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Pagecopy server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
