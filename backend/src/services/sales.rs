//! Sales history service

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::{Sale, SaleLine, SaleMode};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Sales service for reading recorded sales
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
}

/// Row of the `sales` table
#[derive(Debug, FromRow)]
pub(crate) struct SaleRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total: f64,
}

/// Row of the `sale_lines` table
#[derive(Debug, FromRow)]
pub(crate) struct SaleLineRow {
    id: Uuid,
    sale_id: Uuid,
    product_id: Option<Uuid>,
    product_name: String,
    product_price: f64,
    quantity: f64,
    mode: String,
    weight_kg: Option<f64>,
    subtotal: f64,
}

pub(crate) const SALE_LINE_COLUMNS: &str =
    "id, sale_id, product_id, product_name, product_price, quantity, mode, weight_kg, subtotal";

impl TryFrom<SaleLineRow> for SaleLine {
    type Error = AppError;

    fn try_from(row: SaleLineRow) -> Result<Self, Self::Error> {
        let mode: SaleMode = row.mode.parse().map_err(AppError::Internal)?;

        Ok(SaleLine {
            id: row.id,
            sale_id: row.sale_id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_price: row.product_price,
            quantity: row.quantity,
            mode,
            weight_kg: row.weight_kg,
            subtotal: row.subtotal,
        })
    }
}

impl SaleRow {
    pub(crate) fn into_sale(self, lines: Vec<SaleLine>) -> Sale {
        Sale {
            id: self.id,
            created_at: self.created_at,
            total: self.total,
            lines,
        }
    }
}

/// Attach sale lines to their sales, keeping both input orders
fn assemble_sales(sales: Vec<SaleRow>, rows: Vec<SaleLineRow>) -> AppResult<Vec<Sale>> {
    let mut lines: HashMap<Uuid, Vec<SaleLine>> = HashMap::new();
    for row in rows {
        let line = SaleLine::try_from(row)?;
        lines.entry(line.sale_id).or_default().push(line);
    }

    Ok(sales
        .into_iter()
        .map(|sale| {
            let sale_lines = lines.remove(&sale.id).unwrap_or_default();
            sale.into_sale(sale_lines)
        })
        .collect())
}

impl SalesService {
    /// Create a new SalesService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all sales, newest first
    pub async fn list_sales(&self) -> AppResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, SaleRow>(
            "SELECT id, created_at, total FROM sales ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, SaleLineRow>(&format!(
            "SELECT {} FROM sale_lines ORDER BY position",
            SALE_LINE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        assemble_sales(sales, rows)
    }

    /// Get a sale with its lines
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<Sale> {
        let sale = sqlx::query_as::<_, SaleRow>(
            "SELECT id, created_at, total FROM sales WHERE id = $1",
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let lines = sqlx::query_as::<_, SaleLineRow>(&format!(
            "SELECT {} FROM sale_lines WHERE sale_id = $1 ORDER BY position",
            SALE_LINE_COLUMNS
        ))
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(SaleLine::try_from)
        .collect::<AppResult<Vec<_>>>()?;

        Ok(sale.into_sale(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mode: &str) -> SaleLineRow {
        SaleLineRow {
            id: Uuid::new_v4(),
            sale_id: Uuid::new_v4(),
            product_id: None,
            product_name: "Medialunas".to_string(),
            product_price: 80.0,
            quantity: 0.5,
            mode: mode.to_string(),
            weight_kg: Some(0.5),
            subtotal: 2000.0,
        }
    }

    #[test]
    fn test_line_row_keeps_snapshot_after_product_deleted() {
        let line = SaleLine::try_from(row("weight")).unwrap();
        assert_eq!(line.mode, SaleMode::Weight);
        assert_eq!(line.product_id, None);
        assert_eq!(line.product_name, "Medialunas");
    }

    fn history() -> (Vec<SaleRow>, Vec<SaleLineRow>) {
        let created_at = DateTime::parse_from_rfc3339("2025-03-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let (older, newer) = (Uuid::from_u128(1), Uuid::from_u128(2));
        let line = |id, sale_id, product_name: &str, mode: &str| SaleLineRow {
            id: Uuid::from_u128(id),
            sale_id,
            product_id: Some(Uuid::from_u128(100)),
            product_name: product_name.to_string(),
            product_price: 1600.0,
            quantity: 2.0,
            mode: mode.to_string(),
            weight_kg: (mode == "weight").then_some(2.0),
            subtotal: 3200.0,
        };

        (
            vec![
                SaleRow { id: newer, created_at, total: 6400.0 },
                SaleRow { id: older, created_at, total: 3200.0 },
            ],
            vec![
                line(12, newer, "Pan Francés", "unit"),
                line(10, older, "Facturas", "unit"),
                line(11, newer, "Medialunas", "weight"),
            ],
        )
    }

    #[test]
    fn test_sale_listing_is_stable() {
        let (sales, lines) = history();
        let first = serde_json::to_string(&assemble_sales(sales, lines).unwrap()).unwrap();
        let (sales, lines) = history();
        let second = serde_json::to_string(&assemble_sales(sales, lines).unwrap()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_sale_lines_keep_stored_order() {
        let (sales, lines) = history();
        let listed = assemble_sales(sales, lines).unwrap();

        assert_eq!(listed[0].id, Uuid::from_u128(2));
        let names: Vec<&str> = listed[0]
            .lines
            .iter()
            .map(|line| line.product_name.as_str())
            .collect();
        assert_eq!(names, ["Pan Francés", "Medialunas"]);
        assert_eq!(listed[1].lines.len(), 1);
    }

    #[test]
    fn test_unknown_mode_is_internal_error() {
        let err = SaleLine::try_from(row("dozen")).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
