//! Demo data seeding

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult};

/// Admin service for database bootstrap
#[derive(Clone)]
pub struct AdminService {
    db: PgPool,
}

/// Result of seeding the demo data
#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub message: String,
    pub stock_items: usize,
    pub products: usize,
    pub recipe_lines: usize,
}

struct SeedProduct {
    name: &'static str,
    price: f64,
    units_on_hand: f64,
    weight_on_hand_kg: f64,
    units_per_batch: f64,
    weight_per_batch_kg: f64,
    recipe: &'static [(&'static str, f64, &'static str)],
}

const SEED_STOCK: &[(&str, f64, &str)] = &[
    ("Harina", 500.0, "kg"),
    ("Azúcar", 300.0, "kg"),
    ("Levadura", 50.0, "kg"),
    ("Manteca", 100.0, "kg"),
    ("Leche", 200.0, "L"),
    ("Agua", 1000.0, "L"),
];

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Pan Francés",
        price: 1600.0,
        units_on_hand: 50.0,
        weight_on_hand_kg: 6.25,
        units_per_batch: 8.0,
        weight_per_batch_kg: 1.0,
        recipe: &[
            ("Harina", 0.5, "kg"),
            ("Levadura", 0.02, "kg"),
            ("Agua", 0.3, "L"),
        ],
    },
    SeedProduct {
        name: "Medialunas",
        price: 80.0,
        units_on_hand: 100.0,
        weight_on_hand_kg: 2.0,
        units_per_batch: 12.0,
        weight_per_batch_kg: 0.24,
        recipe: &[
            ("Harina", 0.15, "kg"),
            ("Azúcar", 0.05, "kg"),
            ("Levadura", 0.01, "kg"),
            ("Manteca", 0.03, "kg"),
        ],
    },
    SeedProduct {
        name: "Facturas",
        price: 100.0,
        units_on_hand: 75.0,
        weight_on_hand_kg: 2.25,
        units_per_batch: 10.0,
        weight_per_batch_kg: 0.3,
        recipe: &[
            ("Harina", 0.18, "kg"),
            ("Azúcar", 0.06, "kg"),
            ("Manteca", 0.04, "kg"),
            ("Leche", 0.05, "L"),
        ],
    },
    SeedProduct {
        name: "Torta de Chocolate",
        price: 5000.0,
        units_on_hand: 5.0,
        weight_on_hand_kg: 7.5,
        units_per_batch: 1.0,
        weight_per_batch_kg: 1.5,
        recipe: &[
            ("Harina", 0.5, "kg"),
            ("Azúcar", 0.4, "kg"),
            ("Levadura", 0.03, "kg"),
            ("Manteca", 0.2, "kg"),
        ],
    },
    SeedProduct {
        name: "Croissants",
        price: 120.0,
        units_on_hand: 30.0,
        weight_on_hand_kg: 2.1,
        units_per_batch: 6.0,
        weight_per_batch_kg: 0.42,
        recipe: &[
            ("Harina", 0.25, "kg"),
            ("Manteca", 0.1, "kg"),
            ("Leche", 0.05, "L"),
            ("Levadura", 0.01, "kg"),
        ],
    },
];

fn already_seeded() -> AppError {
    AppError::InvalidState("The database already has data".to_string())
}

/// A duplicate stock name while seeding means another seed got there first
fn seed_insert_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        already_seeded()
    } else {
        AppError::DatabaseError(err)
    }
}

impl AdminService {
    /// Create a new AdminService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Load the demo stock, products and recipes into an empty database
    pub async fn init_database(&self) -> AppResult<SeedSummary> {
        let mut tx = self.db.begin().await?;

        // Concurrent seeds wait here and then see the first one's rows
        sqlx::query("LOCK TABLE stock_items IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stock_items")
            .fetch_one(&mut *tx)
            .await?;

        if existing > 0 {
            return Err(already_seeded());
        }

        for (name, quantity, unit) in SEED_STOCK {
            sqlx::query("INSERT INTO stock_items (name, quantity, unit) VALUES ($1, $2, $3)")
                .bind(*name)
                .bind(*quantity)
                .bind(*unit)
                .execute(&mut *tx)
                .await
                .map_err(seed_insert_error)?;
        }

        let mut recipe_lines = 0;
        for product in SEED_PRODUCTS {
            let product_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO products (name, price, units_on_hand, weight_on_hand_kg,
                                      units_per_batch, weight_per_batch_kg)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(product.name)
            .bind(product.price)
            .bind(product.units_on_hand)
            .bind(product.weight_on_hand_kg)
            .bind(product.units_per_batch)
            .bind(product.weight_per_batch_kg)
            .fetch_one(&mut *tx)
            .await?;

            for (ingredient, quantity, unit) in product.recipe {
                sqlx::query(
                    r#"
                    INSERT INTO recipe_lines (product_id, ingredient, quantity, unit)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(product_id)
                .bind(*ingredient)
                .bind(*quantity)
                .bind(*unit)
                .execute(&mut *tx)
                .await?;
                recipe_lines += 1;
            }
        }

        tx.commit().await?;

        tracing::info!(
            stock_items = SEED_STOCK.len(),
            products = SEED_PRODUCTS.len(),
            recipe_lines,
            "Demo data seeded"
        );

        Ok(SeedSummary {
            message: "Database initialized with demo data".to_string(),
            stock_items: SEED_STOCK.len(),
            products: SEED_PRODUCTS.len(),
            recipe_lines,
        })
    }
}
