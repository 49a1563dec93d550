//! Raw-material stock models

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A raw material held in the bakery's store room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: Uuid,
    /// Unique name; recipe lines refer to stock by this name
    pub name: String,
    pub quantity: f64,
    /// Free-text unit label (e.g. "kg", "L")
    pub unit: String,
}

/// Input for creating a stock item
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStockItem {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Quantity cannot be negative"))]
    pub quantity: f64,

    #[validate(length(min = 1, message = "Unit is required"))]
    pub unit: String,
}

/// Partial update for a stock item. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StockItemPatch {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[validate(range(min = 0.0, message = "Quantity cannot be negative"))]
    pub quantity: Option<f64>,

    #[validate(length(min = 1, message = "Unit cannot be empty"))]
    pub unit: Option<String>,
}

impl StockItemPatch {
    pub fn apply(&self, item: &mut StockItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = &self.unit {
            item.unit = unit.clone();
        }
    }

    /// True when the patch renames the item to something other than `current`
    pub fn renames(&self, current: &str) -> bool {
        self.name.as_deref().is_some_and(|name| name != current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flour() -> StockItem {
        StockItem {
            id: Uuid::new_v4(),
            name: "Harina".to_string(),
            quantity: 500.0,
            unit: "kg".to_string(),
        }
    }

    #[test]
    fn test_patch_absent_fields_untouched() {
        let mut item = flour();
        let before = item.clone();

        let patch: StockItemPatch = serde_json::from_str(r#"{"quantity": 420.5}"#).unwrap();
        patch.apply(&mut item);

        assert_eq!(item.quantity, 420.5);
        assert_eq!(item.name, before.name);
        assert_eq!(item.unit, before.unit);
    }

    #[test]
    fn test_patch_same_value_is_unchanged() {
        let mut item = flour();
        let before = item.clone();

        let patch: StockItemPatch =
            serde_json::from_str(r#"{"name": "Harina", "unit": "kg"}"#).unwrap();
        patch.apply(&mut item);

        assert_eq!(item, before);
        assert!(!patch.renames(&before.name));
    }

    #[test]
    fn test_patch_null_treated_as_absent() {
        let mut item = flour();
        let before = item.clone();

        let patch: StockItemPatch = serde_json::from_str(r#"{"name": null}"#).unwrap();
        patch.apply(&mut item);

        assert_eq!(item, before);
    }

    #[test]
    fn test_patch_rename_detected() {
        let patch = StockItemPatch {
            name: Some("Harina 000".to_string()),
            ..Default::default()
        };
        assert!(patch.renames("Harina"));
    }

    #[test]
    fn test_create_validation() {
        let valid = CreateStockItem {
            name: "Leche".to_string(),
            quantity: 0.0,
            unit: "L".to_string(),
        };
        assert!(valid.validate().is_ok());

        let negative = CreateStockItem {
            quantity: -1.0,
            ..valid.clone()
        };
        assert!(negative.validate().is_err());

        let unnamed = CreateStockItem {
            name: String::new(),
            ..valid
        };
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_patch_validation() {
        let patch = StockItemPatch {
            quantity: Some(-3.0),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(StockItemPatch::default().validate().is_ok());
    }
}
