//! HTTP handlers for products, recipes and batch preparation

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{CreateProduct, CreateRecipeLine, PrepareRequest, Product, ProductPatch, RecipeLine};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::services::{InventoryService, ProductService};
use crate::AppState;

/// List all products with their recipes
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Get a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    input.validate()?;

    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
    AppJson(patch): AppJson<ProductPatch>,
) -> AppResult<Json<Product>> {
    patch.validate()?;

    let service = ProductService::new(state.db);
    let product = service.update_product(product_id, patch).await?;
    Ok(Json(product))
}

/// Delete a product and its recipe
pub async fn delete_product(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.db);
    service.delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe line
pub async fn add_recipe_line(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
    AppJson(input): AppJson<CreateRecipeLine>,
) -> AppResult<(StatusCode, Json<RecipeLine>)> {
    input.validate()?;

    let service = ProductService::new(state.db);
    let line = service.add_recipe_line(product_id, input).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

/// Remove a recipe line
pub async fn remove_recipe_line(
    State(state): State<AppState>,
    AppPath((product_id, line_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.db);
    service.remove_recipe_line(product_id, line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Prepare batches of a product, consuming its ingredients
pub async fn prepare_product(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
    AppJson(input): AppJson<PrepareRequest>,
) -> AppResult<Json<Product>> {
    input.validate()?;

    let service = InventoryService::new(state.db);
    let product = service.prepare(product_id, input.quantity).await?;
    Ok(Json(product))
}
