//! Embedded schema migrations
//!
//! Migrations are applied in order, each inside its own transaction, and
//! recorded in `schema_migrations`. Re-running is a no-op.

use sqlx::{Row, SqlitePool};

pub struct Migration {
    pub id: &'static str,
    pub statements: &'static [&'static str],
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        id: "0001_catalog",
        statements: &[
            r"CREATE TABLE IF NOT EXISTS topping_categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT
            )",
            r"CREATE TABLE IF NOT EXISTS toppings (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                category_id TEXT REFERENCES topping_categories(id),
                price TEXT NOT NULL,
                is_available INTEGER NOT NULL DEFAULT 1
            )",
            r"CREATE TABLE IF NOT EXISTS pizzas (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                sizes TEXT NOT NULL DEFAULT '{}',
                image_url TEXT,
                is_available INTEGER NOT NULL DEFAULT 1,
                popularity_score INTEGER NOT NULL DEFAULT 0
            )",
            r"CREATE TABLE IF NOT EXISTS store_locations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                address TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                zip_code TEXT NOT NULL,
                country TEXT NOT NULL DEFAULT 'USA',
                latitude REAL,
                longitude REAL,
                phone TEXT,
                hours TEXT NOT NULL DEFAULT '{}',
                is_active INTEGER NOT NULL DEFAULT 1
            )",
            r"CREATE TABLE IF NOT EXISTS offers (
                id TEXT PRIMARY KEY,
                location_id TEXT REFERENCES store_locations(id),
                title TEXT NOT NULL,
                description TEXT,
                discount_type TEXT NOT NULL
                    CHECK (discount_type IN ('percentage', 'fixed', 'buy_one_get_one')),
                discount_value TEXT NOT NULL,
                min_order_amount TEXT NOT NULL DEFAULT '0',
                code TEXT UNIQUE,
                valid_from INTEGER NOT NULL,
                valid_until INTEGER,
                is_active INTEGER NOT NULL DEFAULT 1
            )",
        ],
    },
    Migration {
        id: "0002_orders",
        statements: &[
            r"CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT,
                email TEXT,
                location_city TEXT,
                preferences TEXT NOT NULL DEFAULT '{}'
            )",
            r"CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                nickname TEXT,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'confirmed', 'preparing', 'ready', 'delivered', 'cancelled')),
                total_price TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            r"CREATE TABLE IF NOT EXISTS order_items (
                id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL REFERENCES orders(id),
                pizza_id TEXT NOT NULL REFERENCES pizzas(id),
                pizza_name TEXT NOT NULL,
                size TEXT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 1),
                toppings TEXT NOT NULL DEFAULT '[]',
                item_price TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)",
        ],
    },
];

/// Apply all pending migrations to the database
pub(crate) async fn apply_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            id TEXT PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    for migration in MIGRATIONS {
        apply_migration(pool, migration).await?;
    }

    Ok(())
}

async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Claim the migration first so concurrent starters serialize on the write lock
    let claimed = sqlx::query(
        "INSERT INTO schema_migrations (id, applied_at) VALUES (?, ?) ON CONFLICT(id) DO NOTHING",
    )
    .bind(migration.id)
    .bind(chrono::Utc::now().timestamp_millis())
    .execute(&mut *tx)
    .await?;

    if claimed.rows_affected() == 0 {
        return Ok(());
    }

    for statement in migration.statements.iter().copied() {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    tracing::info!(migration = migration.id, "Applied migration");
    Ok(())
}

/// Ids of the migrations recorded as applied, oldest first
pub async fn applied_migrations(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query("SELECT id FROM schema_migrations ORDER BY id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(|row| row.try_get("id")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        // One connection: every in-memory connection is its own database
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_migrations_apply_once() {
        let pool = memory_pool().await;

        apply_migrations(&pool).await.unwrap();
        apply_migrations(&pool).await.unwrap();

        let applied = applied_migrations(&pool).await.unwrap();
        let expected: Vec<String> = MIGRATIONS.iter().map(|m| m.id.to_string()).collect();
        assert_eq!(applied, expected);

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('pizzas', 'orders', 'order_items')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 3);
    }
}
