//! Shared types and models for the Bakery Inventory Platform
//!
//! This crate contains the domain models, request payloads and the inventory
//! engine shared between the backend and the browser till (via WASM).

pub mod engine;
pub mod models;

pub use engine::*;
pub use models::*;
