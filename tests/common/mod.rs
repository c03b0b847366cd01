//! Shared fixtures: a seeded database in a throwaway directory

#![allow(dead_code)]

use abc_pizza_mcp::config::DatabaseConfig;
use abc_pizza_mcp::Database;
use sqlx::Row;
use tempfile::TempDir;

/// A seeded database that lives as long as its temp directory
pub struct TestDb {
    pub db: Database,
    _dir: TempDir,
}

pub async fn seeded_db() -> TestDb {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let mut config = DatabaseConfig::for_path(dir.path().join("pizza.db"));
    config.min_pool_size = 1;
    config.max_pool_size = 5;

    let db = Database::open(&config).await.expect("Should open database");
    db.seed().await.expect("Should seed database");

    TestDb { db, _dir: dir }
}

pub async fn pizza_id(db: &Database, name: &str) -> String {
    id_by_name(db, "SELECT id FROM pizzas WHERE name = ?", name).await
}

pub async fn topping_id(db: &Database, name: &str) -> String {
    id_by_name(db, "SELECT id FROM toppings WHERE name = ?", name).await
}

pub async fn location_id(db: &Database, name: &str) -> String {
    id_by_name(db, "SELECT id FROM store_locations WHERE name = ?", name).await
}

pub async fn popularity_of(db: &Database, pizza_id: &str) -> i64 {
    sqlx::query("SELECT popularity_score FROM pizzas WHERE id = ?")
        .bind(pizza_id)
        .fetch_one(db.pool())
        .await
        .expect("Pizza should exist")
        .get("popularity_score")
}

pub async fn count_rows(db: &Database, table: &str) -> i64 {
    sqlx::query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .fetch_one(db.pool())
        .await
        .expect("Count should succeed")
        .get("n")
}

async fn id_by_name(db: &Database, sql: &str, name: &str) -> String {
    sqlx::query(sql)
        .bind(name)
        .fetch_one(db.pool())
        .await
        .unwrap_or_else(|e| panic!("No seeded row named {name}: {e}"))
        .get("id")
}
