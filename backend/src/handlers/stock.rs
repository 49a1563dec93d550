//! HTTP handlers for raw ingredient stock

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{CreateStockItem, StockItem, StockItemPatch};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::services::StockService;
use crate::AppState;

/// List all stock items
pub async fn list_stock(State(state): State<AppState>) -> AppResult<Json<Vec<StockItem>>> {
    let service = StockService::new(state.db);
    let items = service.list_stock().await?;
    Ok(Json(items))
}

/// Get a stock item by ID
pub async fn get_stock_item(
    State(state): State<AppState>,
    AppPath(item_id): AppPath<Uuid>,
) -> AppResult<Json<StockItem>> {
    let service = StockService::new(state.db);
    let item = service.get_stock_item(item_id).await?;
    Ok(Json(item))
}

/// Create a stock item
pub async fn create_stock_item(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateStockItem>,
) -> AppResult<(StatusCode, Json<StockItem>)> {
    input.validate()?;

    let service = StockService::new(state.db);
    let item = service.create_stock_item(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a stock item
pub async fn update_stock_item(
    State(state): State<AppState>,
    AppPath(item_id): AppPath<Uuid>,
    AppJson(patch): AppJson<StockItemPatch>,
) -> AppResult<Json<StockItem>> {
    patch.validate()?;

    let service = StockService::new(state.db);
    let item = service.update_stock_item(item_id, patch).await?;
    Ok(Json(item))
}

/// Delete a stock item
pub async fn delete_stock_item(
    State(state): State<AppState>,
    AppPath(item_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let service = StockService::new(state.db);
    service.delete_stock_item(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
