//! HTTP handlers for the perk API. All read-only: the write path is the
//! extraction pipeline, which never goes through HTTP.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use perkscan_store::{PerkStats, StoredPerk};

use crate::error::ApiError;
use crate::state::AppState;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// List all perks, newest first.
pub async fn list_perks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredPerk>>, ApiError> {
    Ok(Json(state.store.list_all().await?))
}

/// Get a specific perk by id.
pub async fn get_perk(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<StoredPerk>, ApiError> {
    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or(ApiError::PerkNotFound(id))
}

/// List perks whose company name contains the given substring.
pub async fn perks_by_company(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<StoredPerk>>, ApiError> {
    Ok(Json(state.store.find_by_company(&name).await?))
}

/// Aggregate statistics over the stored perks.
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<PerkStats>, ApiError> {
    Ok(Json(state.store.stats().await?))
}
