//! WebAssembly module for the Bakery Inventory Platform
//!
//! Provides client-side computation for:
//! - Unit/weight conversion from batch yields
//! - Sale line and cart quoting with the same rules the server charges by

use std::collections::HashMap;

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
use shared::{plan_sale, quote_line, LineQuote, SalePlan};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("bakery-inventory-wasm ready"));
}

fn ratio(units_per_batch: f64, weight_per_batch_kg: f64) -> YieldRatio {
    YieldRatio {
        units_per_batch,
        weight_per_batch_kg,
    }
}

/// Kilograms per unit for a product yield; 0 when the yield has no units
#[wasm_bindgen]
pub fn kg_per_unit(units_per_batch: f64, weight_per_batch_kg: f64) -> f64 {
    ratio(units_per_batch, weight_per_batch_kg).kg_per_unit()
}

/// Price per kilogram derived from the unit price
#[wasm_bindgen]
pub fn price_per_kg(unit_price: f64, units_per_batch: f64, weight_per_batch_kg: f64) -> f64 {
    ratio(units_per_batch, weight_per_batch_kg).price_per_kg(unit_price)
}

/// Units and kilograms produced by `batches` batches, as `[units, kg]`
#[wasm_bindgen]
pub fn batch_yield(units_per_batch: f64, weight_per_batch_kg: f64, batches: f64) -> Vec<f64> {
    let (units, weight_kg) = ratio(units_per_batch, weight_per_batch_kg).output_of(batches);
    vec![units, weight_kg]
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn quote(
    unit_price: f64,
    units_per_batch: f64,
    weight_per_batch_kg: f64,
    mode: &str,
    quantity: f64,
    weight_quantity: Option<f64>,
) -> Result<LineQuote, String> {
    let mode: SaleMode = mode.parse()?;
    if !is_positive(quantity) {
        return Err("Quantity must be positive".to_string());
    }
    if weight_quantity.is_some_and(|weight| !is_positive(weight)) {
        return Err("Weight must be positive".to_string());
    }
    Ok(quote_line(
        unit_price,
        ratio(units_per_batch, weight_per_batch_kg),
        mode,
        quantity,
        weight_quantity,
    ))
}

/// Quote one sale line. Returns `{"units", "weight_kg", "subtotal"}` as JSON.
#[wasm_bindgen]
pub fn quote_sale_line(
    unit_price: f64,
    units_per_batch: f64,
    weight_per_batch_kg: f64,
    mode: &str,
    quantity: f64,
    weight_quantity: Option<f64>,
) -> Result<String, JsValue> {
    let line = quote(
        unit_price,
        units_per_batch,
        weight_per_batch_kg,
        mode,
        quantity,
        weight_quantity,
    )
    .map_err(|e| js_sys::Error::new(&e))?;

    serde_json::to_string(&line).map_err(|e| js_sys::Error::new(&e.to_string()).into())
}

fn plan_cart(products_json: &str, items_json: &str) -> Result<SalePlan, String> {
    let products: Vec<Product> =
        serde_json::from_str(products_json).map_err(|e| format!("Invalid products JSON: {}", e))?;
    let items: Vec<SaleItemRequest> =
        serde_json::from_str(items_json).map_err(|e| format!("Invalid items JSON: {}", e))?;

    let products: HashMap<_, _> = products.into_iter().map(|p| (p.id, p)).collect();
    plan_sale(&items, &products).map_err(|e| e.to_string())
}

/// Check a whole cart against the products as last fetched from the server.
///
/// Returns the priced lines and total as JSON, or throws with the same
/// message the server would reject the sale with.
#[wasm_bindgen]
pub fn quote_cart(products_json: &str, items_json: &str) -> Result<String, JsValue> {
    let plan = plan_cart(products_json, items_json).map_err(|e| js_sys::Error::new(&e))?;
    serde_json::to_string(&plan).map_err(|e| js_sys::Error::new(&e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kg_per_unit() {
        assert!((kg_per_unit(8.0, 1.0) - 0.125).abs() < 1e-9);
        assert_eq!(kg_per_unit(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_price_per_kg_falls_back_to_unit_price() {
        assert!((price_per_kg(1600.0, 8.0, 1.0) - 12800.0).abs() < 1e-6);
        assert_eq!(price_per_kg(250.0, 0.0, 0.0), 250.0);
    }

    #[test]
    fn test_batch_yield() {
        assert_eq!(batch_yield(8.0, 1.0, 2.0), vec![16.0, 2.0]);
    }

    #[test]
    fn test_quote_by_unit() {
        let line = quote(1600.0, 8.0, 1.0, "unit", 10.0, None).unwrap();
        assert_eq!(line.units, 10.0);
        assert!((line.weight_kg - 1.25).abs() < 1e-9);
        assert!((line.subtotal - 16000.0).abs() < 1e-6);
    }

    #[test]
    fn test_quote_rejects_unknown_mode() {
        assert!(quote(1600.0, 8.0, 1.0, "dozen", 1.0, None).is_err());
        assert!(quote(1600.0, 8.0, 1.0, "unit", 0.0, None).is_err());
    }

    #[test]
    fn test_quote_rejects_bad_weight() {
        for weight in [-2.0, 0.0, f64::NAN, f64::INFINITY] {
            assert!(quote(1600.0, 8.0, 1.0, "weight", 1.0, Some(weight)).is_err());
        }
        let line = quote(1600.0, 8.0, 1.0, "weight", 1.0, Some(0.25)).unwrap();
        assert!((line.subtotal - 3200.0).abs() < 1e-6);
    }

    #[test]
    fn test_cart_reports_short_stock() {
        let id = uuid_str();
        let products = format!(
            r#"[{{"id": "{}", "name": "Pan", "price": 1600, "units_on_hand": 5,
                 "weight_on_hand_kg": 0.625, "units_per_batch": 8,
                 "weight_per_batch_kg": 1.0}}]"#,
            id
        );
        let items = format!(r#"[{{"product_id": "{}", "quantity": 6}}]"#, id);

        let err = plan_cart(&products, &items).unwrap_err();
        assert!(err.contains("Not enough stock of Pan"));

        let items = format!(r#"[{{"product_id": "{}", "quantity": 2}}]"#, id);
        let plan = plan_cart(&products, &items).unwrap();
        assert!((plan.total - 3200.0).abs() < 1e-6);
    }

    fn uuid_str() -> &'static str {
        "6f1c1c7e-2f0e-4d5c-9a43-5b8e2a1d9c10"
    }
}
