//! HTTP request handlers

pub mod admin;
pub mod health;
pub mod products;
pub mod sales;
pub mod stock;
