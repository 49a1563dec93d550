//! Domain models for the Bakery Inventory Platform

mod product;
mod sale;
mod stock;

pub use product::*;
pub use sale::*;
pub use stock::*;
