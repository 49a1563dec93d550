//! Route definitions for the Bakery Inventory Platform

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/stock", stock_routes())
        .nest("/products", product_routes())
        .nest("/sales", sales_routes())
        .route("/admin/init-database", post(handlers::admin::init_database))
}

/// Raw ingredient stock routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::stock::list_stock).post(handlers::stock::create_stock_item),
        )
        .route(
            "/:id",
            get(handlers::stock::get_stock_item)
                .put(handlers::stock::update_stock_item)
                .delete(handlers::stock::delete_stock_item),
        )
}

/// Product, recipe and preparation routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route("/:id/recipe", post(handlers::products::add_recipe_line))
        .route(
            "/:id/recipe/:line_id",
            delete(handlers::products::remove_recipe_line),
        )
        .route("/:id/prepare", post(handlers::products::prepare_product))
}

/// Sales routes
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::sales::list_sales).post(handlers::sales::create_sale),
        )
        .route("/:id", get(handlers::sales::get_sale))
}
