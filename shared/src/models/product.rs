//! Finished-product and recipe models

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One ingredient of a product's recipe, per batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Name of the stock item consumed
    pub ingredient: String,
    /// Quantity consumed per batch
    pub quantity: f64,
    pub unit: String,
}

/// A product sold by the bakery.
///
/// On-hand stock is tracked in two dimensions at once, units and kilograms,
/// kept in step through the yield ratio of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Price of one unit
    pub price: f64,
    pub units_on_hand: f64,
    pub weight_on_hand_kg: f64,
    /// Units produced by one batch
    pub units_per_batch: f64,
    /// Kilograms produced by one batch
    pub weight_per_batch_kg: f64,
    #[serde(default)]
    pub recipe: Vec<RecipeLine>,
}

impl Product {
    pub fn yield_ratio(&self) -> YieldRatio {
        YieldRatio {
            units_per_batch: self.units_per_batch,
            weight_per_batch_kg: self.weight_per_batch_kg,
        }
    }

    pub fn has_recipe(&self) -> bool {
        !self.recipe.is_empty()
    }
}

/// Conversion factor between a product's unit count and its weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldRatio {
    pub units_per_batch: f64,
    pub weight_per_batch_kg: f64,
}

impl YieldRatio {
    /// Weight of one unit; 0 when the batch yields no units
    pub fn kg_per_unit(&self) -> f64 {
        if self.units_per_batch > 0.0 {
            self.weight_per_batch_kg / self.units_per_batch
        } else {
            0.0
        }
    }

    /// Price of one kilogram given the unit price.
    /// Falls back to the unit price when the per-unit weight is unknown.
    pub fn price_per_kg(&self, unit_price: f64) -> f64 {
        let kg_per_unit = self.kg_per_unit();
        if kg_per_unit > 0.0 {
            unit_price / kg_per_unit
        } else {
            unit_price
        }
    }

    /// Units and kilograms produced by `batches` batches
    pub fn output_of(&self, batches: f64) -> (f64, f64) {
        (
            self.units_per_batch * batches,
            self.weight_per_batch_kg * batches,
        )
    }
}

fn default_batch_yield() -> f64 {
    1.0
}

/// Input for creating a product
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Units on hand cannot be negative"))]
    pub units_on_hand: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Weight on hand cannot be negative"))]
    pub weight_on_hand_kg: f64,

    #[serde(default = "default_batch_yield")]
    #[validate(range(min = 0.0, message = "Units per batch cannot be negative"))]
    pub units_per_batch: f64,

    #[serde(default = "default_batch_yield")]
    #[validate(range(min = 0.0, message = "Weight per batch cannot be negative"))]
    pub weight_per_batch_kg: f64,
}

/// Partial update for a product. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,

    #[validate(range(min = 0.0, message = "Units on hand cannot be negative"))]
    pub units_on_hand: Option<f64>,

    #[validate(range(min = 0.0, message = "Weight on hand cannot be negative"))]
    pub weight_on_hand_kg: Option<f64>,

    #[validate(range(min = 0.0, message = "Units per batch cannot be negative"))]
    pub units_per_batch: Option<f64>,

    #[validate(range(min = 0.0, message = "Weight per batch cannot be negative"))]
    pub weight_per_batch_kg: Option<f64>,
}

impl ProductPatch {
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(units) = self.units_on_hand {
            product.units_on_hand = units;
        }
        if let Some(weight) = self.weight_on_hand_kg {
            product.weight_on_hand_kg = weight;
        }
        if let Some(units) = self.units_per_batch {
            product.units_per_batch = units;
        }
        if let Some(weight) = self.weight_per_batch_kg {
            product.weight_per_batch_kg = weight;
        }
    }
}

/// Input for adding an ingredient to a recipe
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecipeLine {
    #[validate(length(min = 1, message = "Ingredient is required"))]
    pub ingredient: String,

    #[validate(range(exclusive_min = 0.0, message = "Quantity must be positive"))]
    pub quantity: f64,

    #[validate(length(min = 1, message = "Unit is required"))]
    pub unit: String,
}

/// Body of a batch preparation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PrepareRequest {
    /// Number of batches, may be fractional
    #[validate(range(exclusive_min = 0.0, message = "Quantity must be positive"))]
    pub quantity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bread() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Pan".to_string(),
            price: 150.0,
            units_on_hand: 50.0,
            weight_on_hand_kg: 6.25,
            units_per_batch: 8.0,
            weight_per_batch_kg: 1.0,
            recipe: Vec::new(),
        }
    }

    #[test]
    fn test_kg_per_unit() {
        assert_eq!(bread().yield_ratio().kg_per_unit(), 0.125);
    }

    #[test]
    fn test_kg_per_unit_zero_yield() {
        let ratio = YieldRatio {
            units_per_batch: 0.0,
            weight_per_batch_kg: 2.0,
        };
        assert_eq!(ratio.kg_per_unit(), 0.0);
        assert_eq!(ratio.price_per_kg(300.0), 300.0);
    }

    #[test]
    fn test_price_per_kg() {
        // 150 per unit at 0.125 kg each
        assert_eq!(bread().yield_ratio().price_per_kg(150.0), 1200.0);
    }

    #[test]
    fn test_output_of() {
        assert_eq!(bread().yield_ratio().output_of(2.0), (16.0, 2.0));
        assert_eq!(bread().yield_ratio().output_of(0.5), (4.0, 0.5));
    }

    #[test]
    fn test_patch_absent_fields_untouched() {
        let mut product = bread();
        let before = product.clone();

        let patch: ProductPatch = serde_json::from_str(r#"{"price": 175}"#).unwrap();
        patch.apply(&mut product);

        assert_eq!(product.price, 175.0);
        assert_eq!(product.name, before.name);
        assert_eq!(product.units_on_hand, before.units_on_hand);
        assert_eq!(product.weight_on_hand_kg, before.weight_on_hand_kg);
        assert_eq!(product.yield_ratio(), before.yield_ratio());
    }

    #[test]
    fn test_patch_same_value_is_unchanged() {
        let mut product = bread();
        let before = product.clone();

        let patch = ProductPatch {
            name: Some("Pan".to_string()),
            units_per_batch: Some(8.0),
            ..Default::default()
        };
        patch.apply(&mut product);

        assert_eq!(product, before);
    }

    #[test]
    fn test_create_product_defaults() {
        let input: CreateProduct =
            serde_json::from_str(r#"{"name": "Facturas", "price": 100}"#).unwrap();
        assert_eq!(input.units_on_hand, 0.0);
        assert_eq!(input.weight_on_hand_kg, 0.0);
        assert_eq!(input.units_per_batch, 1.0);
        assert_eq!(input.weight_per_batch_kg, 1.0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_recipe_line_quantity_must_be_positive() {
        let line = CreateRecipeLine {
            ingredient: "Harina".to_string(),
            quantity: 0.0,
            unit: "kg".to_string(),
        };
        assert!(line.validate().is_err());
    }

    #[test]
    fn test_prepare_request_validation() {
        assert!(PrepareRequest { quantity: 2.0 }.validate().is_ok());
        assert!(PrepareRequest { quantity: 0.0 }.validate().is_err());
        assert!(PrepareRequest { quantity: -1.0 }.validate().is_err());
    }
}
