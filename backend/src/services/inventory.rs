//! Inventory movements: batch preparation and sales
//!
//! Both operations lock every row they touch, plan against the locked
//! snapshot and write the result back in the same transaction, so either
//! every quantity changes or none does.

use std::collections::HashMap;

use shared::{plan_batch, plan_sale, CreateSale, Product, Sale, SaleLine, StockItem};
use sqlx::PgPool;
use uuid::Uuid;

use super::product::{load_product, store_product_stock, ProductRow, PRODUCT_COLUMNS};
use super::sales::{SaleLineRow, SaleRow, SALE_LINE_COLUMNS};
use super::stock::StockItemRow;
use crate::error::{AppError, AppResult};

/// Inventory service for stock-changing operations
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Prepare `batches` batches of a product from its recipe
    pub async fn prepare(&self, product_id: Uuid, batches: f64) -> AppResult<Product> {
        let mut tx = self.db.begin().await?;

        let mut product = load_product(&mut *tx, product_id, true)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let names: Vec<String> = product
            .recipe
            .iter()
            .map(|line| line.ingredient.clone())
            .collect();

        let mut stock: HashMap<String, StockItem> = sqlx::query_as::<_, StockItemRow>(
            r#"
            SELECT id, name, quantity, unit
            FROM stock_items
            WHERE name = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(&names)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| (row.name.clone(), StockItem::from(row)))
        .collect();

        let plan = plan_batch(&product, batches, &stock)?;
        plan.apply(&mut product, &mut stock);

        for debit in &plan.debits {
            if let Some(item) = stock.get(&debit.ingredient) {
                tracing::debug!(
                    ingredient = %item.name,
                    debited = debit.quantity,
                    remaining = item.quantity,
                    "Ingredient debited"
                );
            }
        }

        for item in stock.values() {
            sqlx::query("UPDATE stock_items SET quantity = $1, updated_at = NOW() WHERE id = $2")
                .bind(item.quantity)
                .bind(item.id)
                .execute(&mut *tx)
                .await?;
        }

        store_product_stock(&mut *tx, &product).await?;

        tx.commit().await?;

        tracing::info!(
            product_id = %product.id,
            batches,
            units = plan.units_produced,
            weight_kg = plan.weight_produced_kg,
            "Batch prepared"
        );

        Ok(product)
    }

    /// Record a sale and debit the finished-goods stock of every product in it
    pub async fn sell(&self, input: CreateSale) -> AppResult<Sale> {
        let mut ids: Vec<Uuid> = input.items.iter().map(|item| item.product_id).collect();
        ids.sort();
        ids.dedup();

        let mut tx = self.db.begin().await?;

        let mut products: HashMap<Uuid, Product> = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| {
            let product = row.into_product(Vec::new());
            (product.id, product)
        })
        .collect();

        let plan = plan_sale(&input.items, &products)?;
        plan.apply(&mut products);

        let sale = sqlx::query_as::<_, SaleRow>(
            "INSERT INTO sales (total) VALUES ($1) RETURNING id, created_at, total",
        )
        .bind(plan.total)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let row = sqlx::query_as::<_, SaleLineRow>(&format!(
                r#"
                INSERT INTO sale_lines (sale_id, product_id, product_name, product_price,
                                        quantity, mode, weight_kg, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {}
                "#,
                SALE_LINE_COLUMNS
            ))
            .bind(sale.id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.product_price)
            .bind(line.quantity)
            .bind(line.mode.as_str())
            .bind(line.weight_kg)
            .bind(line.subtotal)
            .fetch_one(&mut *tx)
            .await?;

            lines.push(SaleLine::try_from(row)?);
        }

        for product_id in plan.product_ids() {
            if let Some(product) = products.get(&product_id) {
                store_product_stock(&mut *tx, product).await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            lines = lines.len(),
            total = sale.total,
            "Sale recorded"
        );

        Ok(sale.into_sale(lines))
    }
}
