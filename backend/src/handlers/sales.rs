//! HTTP handlers for sales

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{CreateSale, Sale};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::services::{InventoryService, SalesService};
use crate::AppState;

/// List all sales, newest first
pub async fn list_sales(State(state): State<AppState>) -> AppResult<Json<Vec<Sale>>> {
    let service = SalesService::new(state.db);
    let sales = service.list_sales().await?;
    Ok(Json(sales))
}

/// Get a sale by ID
pub async fn get_sale(
    State(state): State<AppState>,
    AppPath(sale_id): AppPath<Uuid>,
) -> AppResult<Json<Sale>> {
    let service = SalesService::new(state.db);
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// Record a sale
pub async fn create_sale(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateSale>,
) -> AppResult<(StatusCode, Json<Sale>)> {
    input.validate()?;

    let service = InventoryService::new(state.db);
    let sale = service.sell(input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}
