//! Pagecopy Server Binary
//!
//! Standalone server for the copy-translated-content API.

use std::sync::Arc;

use pagecopy_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let addr = std::env::var("PAGECOPY_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let db = std::env::var("PAGECOPY_DB").unwrap_or_else(|_| "pagecopy.db".to_string());

    let state = if db == ":memory:" {
        AppState::new()?
    } else {
        AppState::with_database(&db)?
    };
    tracing::info!("using database {}", db);

    serve(&addr, Arc::new(state)).await
}
