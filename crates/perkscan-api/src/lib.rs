//! Read-only HTTP API over the perk store.
//!
//! Provides REST endpoints for:
//! - Listing all stored perks
//! - Fetching one perk by id
//! - Filtering by company name
//! - Aggregate statistics

mod error;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use perkscan_store::PerkStore;

pub use error::ApiError;
pub use state::AppState;

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/perks", get(handlers::list_perks))
        .route("/api/perks/:id", get(handlers::get_perk))
        .route("/api/perks/company/:name", get(handlers::perks_by_company))
        .route("/api/stats", get(handlers::stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API on the given port until the process exits.
pub async fn serve(store: PerkStore, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState { store });
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("starting perk API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
