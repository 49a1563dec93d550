//! Raw ingredient stock service

use shared::{CreateStockItem, StockItem, StockItemPatch};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult};

/// Stock service for ingredient CRUD
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Row of the `stock_items` table
#[derive(Debug, FromRow)]
pub(crate) struct StockItemRow {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl From<StockItemRow> for StockItem {
    fn from(row: StockItemRow) -> Self {
        StockItem {
            id: row.id,
            name: row.name,
            quantity: row.quantity,
            unit: row.unit,
        }
    }
}

fn duplicate_name(name: &str) -> AppError {
    AppError::Conflict {
        resource: "stock_item".to_string(),
        message: format!("A stock item named '{}' already exists", name),
    }
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all stock items ordered by name
    pub async fn list_stock(&self) -> AppResult<Vec<StockItem>> {
        let rows = sqlx::query_as::<_, StockItemRow>(
            "SELECT id, name, quantity, unit FROM stock_items ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(StockItem::from).collect())
    }

    /// Get a stock item by ID
    pub async fn get_stock_item(&self, item_id: Uuid) -> AppResult<StockItem> {
        sqlx::query_as::<_, StockItemRow>(
            "SELECT id, name, quantity, unit FROM stock_items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .map(StockItem::from)
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))
    }

    /// Create a stock item; names are unique
    pub async fn create_stock_item(&self, input: CreateStockItem) -> AppResult<StockItem> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock_items WHERE name = $1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(duplicate_name(&input.name));
        }

        let row = sqlx::query_as::<_, StockItemRow>(
            r#"
            INSERT INTO stock_items (name, quantity, unit)
            VALUES ($1, $2, $3)
            RETURNING id, name, quantity, unit
            "#,
        )
        .bind(&input.name)
        .bind(input.quantity)
        .bind(&input.unit)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_name(&input.name)
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        tracing::info!(stock_item_id = %row.id, name = %row.name, "Stock item created");

        Ok(row.into())
    }

    /// Update the fields present in `patch`
    pub async fn update_stock_item(
        &self,
        item_id: Uuid,
        patch: StockItemPatch,
    ) -> AppResult<StockItem> {
        let mut tx = self.db.begin().await?;

        let mut item: StockItem = sqlx::query_as::<_, StockItemRow>(
            "SELECT id, name, quantity, unit FROM stock_items WHERE id = $1 FOR UPDATE",
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(StockItem::from)
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        if patch.renames(&item.name) {
            if let Some(new_name) = patch.name.as_deref() {
                let taken = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM stock_items WHERE name = $1 AND id <> $2)",
                )
                .bind(new_name)
                .bind(item_id)
                .fetch_one(&mut *tx)
                .await?;

                if taken {
                    return Err(duplicate_name(new_name));
                }
            }
        }

        patch.apply(&mut item);

        sqlx::query(
            r#"
            UPDATE stock_items
            SET name = $1, quantity = $2, unit = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_name(&item.name)
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        tx.commit().await?;

        Ok(item)
    }

    /// Delete a stock item
    pub async fn delete_stock_item(&self, item_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM stock_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock item".to_string()));
        }

        tracing::info!(stock_item_id = %item_id, "Stock item deleted");
        Ok(())
    }
}
