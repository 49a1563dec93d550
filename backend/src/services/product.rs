//! Product ledger and recipe service

use std::collections::HashMap;

use shared::{CreateProduct, CreateRecipeLine, Product, ProductPatch, RecipeLine};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Product service for product CRUD and recipe management
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Row of the `products` table
#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    id: Uuid,
    name: String,
    price: f64,
    units_on_hand: f64,
    weight_on_hand_kg: f64,
    units_per_batch: f64,
    weight_per_batch_kg: f64,
}

impl ProductRow {
    pub(crate) fn into_product(self, recipe: Vec<RecipeLine>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            price: self.price,
            units_on_hand: self.units_on_hand,
            weight_on_hand_kg: self.weight_on_hand_kg,
            units_per_batch: self.units_per_batch,
            weight_per_batch_kg: self.weight_per_batch_kg,
            recipe,
        }
    }
}

/// Row of the `recipe_lines` table
#[derive(Debug, FromRow)]
struct RecipeLineRow {
    id: Uuid,
    product_id: Uuid,
    ingredient: String,
    quantity: f64,
    unit: String,
}

impl From<RecipeLineRow> for RecipeLine {
    fn from(row: RecipeLineRow) -> Self {
        RecipeLine {
            id: row.id,
            product_id: row.product_id,
            ingredient: row.ingredient,
            quantity: row.quantity,
            unit: row.unit,
        }
    }
}

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, price, units_on_hand, weight_on_hand_kg, units_per_batch, weight_per_batch_kg";

/// Load a product with its recipe, optionally locking the product row
pub(crate) async fn load_product(
    conn: &mut PgConnection,
    product_id: Uuid,
    for_update: bool,
) -> AppResult<Option<Product>> {
    let lock = if for_update { " FOR UPDATE" } else { "" };
    let sql = format!("SELECT {} FROM products WHERE id = $1{}", PRODUCT_COLUMNS, lock);

    let Some(row) = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let recipe = load_recipe(conn, product_id).await?;
    Ok(Some(row.into_product(recipe)))
}

async fn load_recipe(conn: &mut PgConnection, product_id: Uuid) -> AppResult<Vec<RecipeLine>> {
    let rows = sqlx::query_as::<_, RecipeLineRow>(
        r#"
        SELECT id, product_id, ingredient, quantity, unit
        FROM recipe_lines
        WHERE product_id = $1
        ORDER BY position
        "#,
    )
    .bind(product_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(RecipeLine::from).collect())
}

/// Persist the on-hand totals of a product
pub(crate) async fn store_product_stock(conn: &mut PgConnection, product: &Product) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET units_on_hand = $1, weight_on_hand_kg = $2, updated_at = NOW()
        WHERE id = $3
        "#,
    )
    .bind(product.units_on_hand)
    .bind(product.weight_on_hand_kg)
    .bind(product.id)
    .execute(conn)
    .await?;

    Ok(())
}

/// Attach recipe lines to their products, keeping both input orders
fn assemble_products(rows: Vec<ProductRow>, lines: Vec<RecipeLineRow>) -> Vec<Product> {
    let mut recipes: HashMap<Uuid, Vec<RecipeLine>> = HashMap::new();
    for line in lines {
        recipes.entry(line.product_id).or_default().push(line.into());
    }

    rows.into_iter()
        .map(|row| {
            let recipe = recipes.remove(&row.id).unwrap_or_default();
            row.into_product(recipe)
        })
        .collect()
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all products with their recipes
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name, id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let lines = sqlx::query_as::<_, RecipeLineRow>(
            r#"
            SELECT id, product_id, ingredient, quantity, unit
            FROM recipe_lines
            ORDER BY position
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(assemble_products(rows, lines))
    }

    /// Get a product by ID
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let mut conn = self.db.acquire().await?;
        load_product(&mut *conn, product_id, false)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Create a new product with an empty recipe
    pub async fn create_product(&self, input: CreateProduct) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (name, price, units_on_hand, weight_on_hand_kg,
                                  units_per_batch, weight_per_batch_kg)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.name)
        .bind(input.price)
        .bind(input.units_on_hand)
        .bind(input.weight_on_hand_kg)
        .bind(input.units_per_batch)
        .bind(input.weight_per_batch_kg)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(product_id = %row.id, name = %row.name, "Product created");

        Ok(row.into_product(Vec::new()))
    }

    /// Update the fields present in `patch`
    pub async fn update_product(&self, product_id: Uuid, patch: ProductPatch) -> AppResult<Product> {
        let mut tx = self.db.begin().await?;

        let mut product = load_product(&mut *tx, product_id, true)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        patch.apply(&mut product);

        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, price = $2, units_on_hand = $3, weight_on_hand_kg = $4,
                units_per_batch = $5, weight_per_batch_kg = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.units_on_hand)
        .bind(product.weight_on_hand_kg)
        .bind(product.units_per_batch)
        .bind(product.weight_per_batch_kg)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Delete a product; its recipe lines go with it
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        tracing::info!(product_id = %product_id, "Product deleted");
        Ok(())
    }

    /// Add an ingredient to a product's recipe
    pub async fn add_recipe_line(
        &self,
        product_id: Uuid,
        input: CreateRecipeLine,
    ) -> AppResult<RecipeLine> {
        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let ingredient_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock_items WHERE name = $1)",
        )
        .bind(&input.ingredient)
        .fetch_one(&self.db)
        .await?;

        if !ingredient_exists {
            return Err(AppError::NotFound(format!(
                "Stock item '{}'",
                input.ingredient
            )));
        }

        let row = sqlx::query_as::<_, RecipeLineRow>(
            r#"
            INSERT INTO recipe_lines (product_id, ingredient, quantity, unit)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, ingredient, quantity, unit
            "#,
        )
        .bind(product_id)
        .bind(&input.ingredient)
        .bind(input.quantity)
        .bind(&input.unit)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Remove an ingredient from a product's recipe
    pub async fn remove_recipe_line(&self, product_id: Uuid, line_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recipe_lines WHERE id = $1 AND product_id = $2")
            .bind(line_id)
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Recipe line".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pan: Uuid, torta: Uuid) -> (Vec<ProductRow>, Vec<RecipeLineRow>) {
        let product = |id, name: &str, units_per_batch| ProductRow {
            id,
            name: name.to_string(),
            price: 1600.0,
            units_on_hand: 50.0,
            weight_on_hand_kg: 6.25,
            units_per_batch,
            weight_per_batch_kg: 1.0,
        };
        let line = |id, product_id, ingredient: &str, quantity| RecipeLineRow {
            id,
            product_id,
            ingredient: ingredient.to_string(),
            quantity,
            unit: "kg".to_string(),
        };

        (
            vec![product(pan, "Pan Francés", 8.0), product(torta, "Torta de Chocolate", 1.0)],
            vec![
                line(Uuid::from_u128(3), pan, "Levadura", 0.02),
                line(Uuid::from_u128(1), torta, "Harina", 0.5),
                line(Uuid::from_u128(2), pan, "Harina", 0.5),
            ],
        )
    }

    #[test]
    fn test_product_listing_is_stable() {
        let (pan, torta) = (Uuid::from_u128(10), Uuid::from_u128(20));

        let (first_rows, first_lines) = rows(pan, torta);
        let (second_rows, second_lines) = rows(pan, torta);
        let first = serde_json::to_string(&assemble_products(first_rows, first_lines)).unwrap();
        let second = serde_json::to_string(&assemble_products(second_rows, second_lines)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_recipe_lines_keep_stored_order() {
        let (pan, torta) = (Uuid::from_u128(10), Uuid::from_u128(20));
        let (product_rows, lines) = rows(pan, torta);

        let products = assemble_products(product_rows, lines);

        assert_eq!(products[0].name, "Pan Francés");
        let ingredients: Vec<&str> = products[0]
            .recipe
            .iter()
            .map(|line| line.ingredient.as_str())
            .collect();
        assert_eq!(ingredients, ["Levadura", "Harina"]);
        assert_eq!(products[1].recipe.len(), 1);
    }

    #[test]
    fn test_product_without_recipe_lists_empty() {
        let (pan, torta) = (Uuid::from_u128(10), Uuid::from_u128(20));
        let (product_rows, _) = rows(pan, torta);

        let products = assemble_products(product_rows, Vec::new());

        assert!(products.iter().all(|product| product.recipe.is_empty()));
    }
}
