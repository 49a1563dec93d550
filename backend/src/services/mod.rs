//! Business logic services for the Bakery Inventory Platform

pub mod admin;
pub mod inventory;
pub mod product;
pub mod sales;
pub mod stock;

pub use admin::AdminService;
pub use inventory::InventoryService;
pub use product::ProductService;
pub use sales::SalesService;
pub use stock::StockService;
