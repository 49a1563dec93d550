//! Sales ledger models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// How a sale line is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleMode {
    /// Quantity is a unit count
    #[default]
    Unit,
    /// Quantity is in kilograms
    Weight,
}

impl SaleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleMode::Unit => "unit",
            SaleMode::Weight => "weight",
        }
    }
}

impl std::fmt::Display for SaleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unit" => Ok(SaleMode::Unit),
            "weight" => Ok(SaleMode::Weight),
            other => Err(format!("unknown sale mode '{}'", other)),
        }
    }
}

/// A completed sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total: f64,
    pub lines: Vec<SaleLine>,
}

/// One line of a sale. Name and price are captured when the sale is made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: Uuid,
    pub sale_id: Uuid,
    /// Cleared if the product is later deleted
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub product_price: f64,
    pub quantity: f64,
    pub mode: SaleMode,
    /// Kilograms sold, only for weight sales
    pub weight_kg: Option<f64>,
    pub subtotal: f64,
}

/// One requested line of a new sale
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaleItemRequest {
    pub product_id: Uuid,

    #[validate(range(exclusive_min = 0.0, message = "Quantity must be positive"))]
    pub quantity: f64,

    #[serde(default)]
    pub mode: SaleMode,

    /// Weight to sell in kilograms; `quantity` is used when absent
    #[validate(range(exclusive_min = 0.0, message = "Weight must be positive"))]
    pub weight_quantity: Option<f64>,
}

/// Input for creating a sale
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSale {
    #[validate(length(min = 1, message = "A sale needs at least one item"), nested)]
    pub items: Vec<SaleItemRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_mode_round_trip() {
        for mode in [SaleMode::Unit, SaleMode::Weight] {
            assert_eq!(mode.as_str().parse::<SaleMode>(), Ok(mode));
        }
        assert!("kg".parse::<SaleMode>().is_err());
    }

    #[test]
    fn test_sale_mode_defaults_to_unit() {
        let item: SaleItemRequest = serde_json::from_str(&format!(
            r#"{{"product_id": "{}", "quantity": 3}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(item.mode, SaleMode::Unit);
        assert_eq!(item.weight_quantity, None);
    }

    #[test]
    fn test_sale_mode_json() {
        assert_eq!(serde_json::to_string(&SaleMode::Weight).unwrap(), r#""weight""#);
    }

    #[test]
    fn test_empty_sale_rejected() {
        let sale = CreateSale { items: Vec::new() };
        assert!(sale.validate().is_err());
    }

    #[test]
    fn test_empty_sale_reports_items_field() {
        let errors = CreateSale { items: Vec::new() }.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let items = field_errors.get("items").expect("items error");
        assert_eq!(items[0].code, "length");
    }

    #[test]
    fn test_nested_item_validated() {
        let sale = CreateSale {
            items: vec![SaleItemRequest {
                product_id: Uuid::new_v4(),
                quantity: 0.0,
                mode: SaleMode::Unit,
                weight_quantity: None,
            }],
        };
        assert!(sale.validate().is_err());
    }
}
