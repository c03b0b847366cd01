//! Popularity rankings derived from placed orders

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::types::{PopularPizza, PopularTopping};
use crate::storage::{decimal_from_column, uuid_from_column};

#[derive(Clone)]
pub struct PopularityStorage {
    pool: SqlitePool,
}

impl PopularityStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Available toppings ranked by the number of order items that carry them
    ///
    /// Toppings that were never ordered are not listed.
    pub async fn popular_toppings(&self, limit: u32) -> Result<Vec<PopularTopping>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, tc.name AS category_name, t.price, \
                    COUNT(DISTINCT oi.id) AS order_count \
             FROM toppings t \
             LEFT JOIN topping_categories tc ON t.category_id = tc.id \
             JOIN order_items oi ON EXISTS ( \
                 SELECT 1 FROM json_each(CASE WHEN json_valid(oi.toppings) THEN oi.toppings ELSE '[]' END) j \
                 WHERE j.value = t.id) \
             WHERE t.is_available = 1 \
             GROUP BY t.id, t.name, tc.name, t.price \
             ORDER BY order_count DESC, t.name ASC \
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_popular_topping).collect()
    }

    /// Available pizzas ranked by their accumulated popularity score
    pub async fn popular_pizzas(&self, limit: u32) -> Result<Vec<PopularPizza>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, name, popularity_score FROM pizzas \
             WHERE is_available = 1 \
             ORDER BY popularity_score DESC, name ASC \
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PopularPizza {
                    id: uuid_from_column(row.try_get("id")?)?,
                    name: row.try_get("name")?,
                    popularity_score: row.try_get("popularity_score")?,
                })
            })
            .collect()
    }
}

fn row_to_popular_topping(row: &SqliteRow) -> Result<PopularTopping, sqlx::Error> {
    Ok(PopularTopping {
        id: uuid_from_column(row.try_get("id")?)?,
        name: row.try_get("name")?,
        category_name: row.try_get("category_name")?,
        price: decimal_from_column(row.try_get("price")?)?,
        order_count: row.try_get("order_count")?,
    })
}

/// Add `quantity` to a pizza's popularity score inside the caller's transaction
pub(crate) async fn bump_pizza_popularity(
    conn: &mut SqliteConnection,
    pizza_id: Uuid,
    quantity: u32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE pizzas SET popularity_score = popularity_score + ? WHERE id = ?")
        .bind(i64::from(quantity))
        .bind(pizza_id.to_string())
        .execute(conn)
        .await?;
    Ok(())
}
