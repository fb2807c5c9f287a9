//! Database seeder.
//!
//! Populates the products table with a fixed demo catalog. Existing rows are
//! cleared first so the seeder is idempotent.

use catalog_api::{ApiError, ApiResult, DbConfig, PgRecordStore, RecordStore};
use catalog_core::ItemDraft;

const PRODUCTS: &[(&str, f64)] = &[
    ("iPhone 15 Pro", 1199.99),
    ("MacBook Air M2", 1099.99),
    ("Samsung Galaxy S24", 899.99),
    ("iPad Air", 599.99),
    ("Dell XPS 13", 999.99),
    ("Sony WH-1000XM5", 349.99),
    ("Nintendo Switch", 299.99),
    ("Apple Watch Series 9", 399.99),
    ("Lenovo ThinkPad X1", 1299.99),
    ("AirPods Pro", 249.99),
    ("Samsung 4K Monitor", 399.99),
    ("Logitech MX Master 3", 99.99),
    ("Mechanical Keyboard", 149.99),
    ("Webcam HD 1080p", 79.99),
    ("External SSD 1TB", 119.99),
    ("Gaming Chair", 299.99),
    ("Standing Desk", 499.99),
    ("Wireless Charger", 39.99),
    ("Bluetooth Speaker", 89.99),
    ("USB-C Hub", 59.99),
];

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_config = DbConfig::from_env();
    let pool = db_config.create_pool()?;
    let store = PgRecordStore::new(pool.clone());

    tracing::info!("connecting to database");
    store
        .ensure_schema()
        .await
        .map_err(|e| ApiError::database_error(format!("Schema setup failed: {}", e)))?;

    let conn = pool
        .get()
        .await
        .map_err(|e| ApiError::database_error(format!("Connection failed: {}", e)))?;

    let row = conn
        .query_one("SELECT COUNT(*) FROM products", &[])
        .await
        .map_err(|e| ApiError::database_error(e.to_string()))?;
    let existing: i64 = row.get(0);
    if existing > 0 {
        tracing::info!(existing, "clearing existing products");
        conn.execute("TRUNCATE products", &[])
            .await
            .map_err(|e| ApiError::database_error(e.to_string()))?;
    }
    drop(conn);

    tracing::info!("seeding products");
    for (name, price) in PRODUCTS {
        store
            .insert(ItemDraft {
                name: name.to_string(),
                price: *price,
                category: None,
                description: None,
            })
            .await?;
    }

    tracing::info!(count = PRODUCTS.len(), "seeding complete");
    Ok(())
}
