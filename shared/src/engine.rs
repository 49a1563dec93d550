//! Inventory conversion and debit engine
//!
//! Batch preparation and sale processing are split in two steps. A `plan_*`
//! function checks every precondition against a snapshot of the stores and
//! returns the complete set of debits and credits, or an error with nothing
//! computed. The plan's `apply` then mutates the snapshot. Callers persist the
//! applied snapshot inside one storage transaction, so a rejected request
//! never leaves a partial debit behind.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Product, SaleItemRequest, SaleMode, StockItem, YieldRatio};

/// Failures of an inventory operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
}

pub type InventoryResult<T> = Result<T, InventoryError>;

impl InventoryError {
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        InventoryError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

fn ensure_positive(field: &'static str, value: f64) -> InventoryResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(InventoryError::Validation {
            field,
            message: format!("must be a positive number, got {}", value),
        })
    }
}

// ============================================================================
// Batch preparation
// ============================================================================

/// Raw material consumed by a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientDebit {
    pub stock_item_id: Uuid,
    pub ingredient: String,
    pub quantity: f64,
    pub unit: String,
}

/// Validated effect of preparing a product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchPlan {
    pub product_id: Uuid,
    pub batches: f64,
    pub debits: Vec<IngredientDebit>,
    pub units_produced: f64,
    pub weight_produced_kg: f64,
}

/// Check that `batches` batches of `product` can be made from `stock`.
///
/// `stock` is keyed by stock item name. Recipe lines naming the same
/// ingredient draw on the same on-hand quantity.
pub fn plan_batch(
    product: &Product,
    batches: f64,
    stock: &HashMap<String, StockItem>,
) -> InventoryResult<BatchPlan> {
    ensure_positive("quantity", batches)?;

    if !product.has_recipe() {
        return Err(InventoryError::InvalidState(format!(
            "Product '{}' has no recipe defined",
            product.name
        )));
    }

    let mut required: HashMap<&str, f64> = HashMap::new();
    let mut debits = Vec::with_capacity(product.recipe.len());

    for line in &product.recipe {
        let item = stock
            .get(&line.ingredient)
            .ok_or_else(|| InventoryError::not_found("Stock item", &line.ingredient))?;

        let needed = line.quantity * batches;
        let total = required.entry(item.name.as_str()).or_insert(0.0);
        *total += needed;

        if item.quantity < *total {
            return Err(InventoryError::InsufficientStock(format!(
                "Not enough {}: need {} {} but only {} {} on hand",
                item.name, total, line.unit, item.quantity, item.unit
            )));
        }

        debits.push(IngredientDebit {
            stock_item_id: item.id,
            ingredient: item.name.clone(),
            quantity: needed,
            unit: line.unit.clone(),
        });
    }

    let (units_produced, weight_produced_kg) = product.yield_ratio().output_of(batches);

    Ok(BatchPlan {
        product_id: product.id,
        batches,
        debits,
        units_produced,
        weight_produced_kg,
    })
}

impl BatchPlan {
    /// Debit the ingredients and credit the product
    pub fn apply(&self, product: &mut Product, stock: &mut HashMap<String, StockItem>) {
        for debit in &self.debits {
            if let Some(item) = stock.get_mut(&debit.ingredient) {
                item.quantity -= debit.quantity;
            }
        }
        product.units_on_hand += self.units_produced;
        product.weight_on_hand_kg += self.weight_produced_kg;
    }
}

// ============================================================================
// Sales
// ============================================================================

/// Units, weight and price of one sale line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineQuote {
    pub units: f64,
    pub weight_kg: f64,
    pub subtotal: f64,
}

/// Convert a requested quantity into both stock dimensions and price it.
///
/// In weight mode `weight_quantity` takes precedence over `quantity`.
pub fn quote_line(
    unit_price: f64,
    ratio: YieldRatio,
    mode: SaleMode,
    quantity: f64,
    weight_quantity: Option<f64>,
) -> LineQuote {
    let kg_per_unit = ratio.kg_per_unit();
    match mode {
        SaleMode::Unit => LineQuote {
            units: quantity,
            weight_kg: quantity * kg_per_unit,
            subtotal: unit_price * quantity,
        },
        SaleMode::Weight => {
            let weight_kg = weight_quantity.unwrap_or(quantity);
            let units = if kg_per_unit > 0.0 {
                weight_kg / kg_per_unit
            } else {
                0.0
            };
            LineQuote {
                units,
                weight_kg,
                subtotal: ratio.price_per_kg(unit_price) * weight_kg,
            }
        }
    }
}

/// Validated line of a sale, with the product snapshot taken at plan time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedSaleLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_price: f64,
    pub quantity: f64,
    pub mode: SaleMode,
    pub weight_kg: Option<f64>,
    pub units_debit: f64,
    pub weight_debit_kg: f64,
    pub subtotal: f64,
}

/// Validated effect of a sale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalePlan {
    pub lines: Vec<PlannedSaleLine>,
    pub total: f64,
}

/// Check that every item can be served from `products` and price the sale.
///
/// Several items for the same product are checked against what remains after
/// the earlier items.
pub fn plan_sale(
    items: &[SaleItemRequest],
    products: &HashMap<Uuid, Product>,
) -> InventoryResult<SalePlan> {
    if items.is_empty() {
        return Err(InventoryError::Validation {
            field: "items",
            message: "a sale needs at least one item".to_string(),
        });
    }

    let mut remaining: HashMap<Uuid, (f64, f64)> = HashMap::new();
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        ensure_positive("quantity", item.quantity)?;
        if let Some(weight) = item.weight_quantity {
            ensure_positive("weight_quantity", weight)?;
        }

        let product = products
            .get(&item.product_id)
            .ok_or_else(|| InventoryError::not_found("Product", item.product_id))?;

        let quote = quote_line(
            product.price,
            product.yield_ratio(),
            item.mode,
            item.quantity,
            item.weight_quantity,
        );

        let (units_left, weight_left) = remaining
            .entry(product.id)
            .or_insert((product.units_on_hand, product.weight_on_hand_kg));

        match item.mode {
            SaleMode::Unit if *units_left < quote.units => {
                return Err(InventoryError::InsufficientStock(format!(
                    "Not enough stock of {}: {} units available, {} requested",
                    product.name, units_left, quote.units
                )));
            }
            SaleMode::Weight if *weight_left < quote.weight_kg => {
                return Err(InventoryError::InsufficientStock(format!(
                    "Not enough stock of {}: {} kg available, {} kg requested",
                    product.name, weight_left, quote.weight_kg
                )));
            }
            _ => {}
        }

        *units_left -= quote.units;
        *weight_left -= quote.weight_kg;

        lines.push(PlannedSaleLine {
            product_id: product.id,
            product_name: product.name.clone(),
            product_price: product.price,
            quantity: item.quantity,
            mode: item.mode,
            weight_kg: (item.mode == SaleMode::Weight).then_some(quote.weight_kg),
            units_debit: quote.units,
            weight_debit_kg: quote.weight_kg,
            subtotal: quote.subtotal,
        });
    }

    let total = lines.iter().map(|line| line.subtotal).sum();

    Ok(SalePlan { lines, total })
}

impl SalePlan {
    /// Debit every product by its lines
    pub fn apply(&self, products: &mut HashMap<Uuid, Product>) {
        for line in &self.lines {
            if let Some(product) = products.get_mut(&line.product_id) {
                product.units_on_hand -= line.units_debit;
                product.weight_on_hand_kg -= line.weight_debit_kg;
            }
        }
    }

    /// Distinct products touched by the sale, in first-seen order
    pub fn product_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::new();
        for line in &self.lines {
            if !ids.contains(&line.product_id) {
                ids.push(line.product_id);
            }
        }
        ids
    }
}
