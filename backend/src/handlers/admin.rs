//! HTTP handlers for database administration

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::{admin::SeedSummary, AdminService};
use crate::AppState;

/// Seed the demo stock and products into an empty database
pub async fn init_database(State(state): State<AppState>) -> AppResult<Json<SeedSummary>> {
    let service = AdminService::new(state.db);
    let summary = service.init_database().await?;
    Ok(Json(summary))
}
