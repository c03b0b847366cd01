//! Order persistence: placement, lookup, cancellation and status changes

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::types::{CancelledOrder, Order, OrderItem, OrderItemInput, OrderStatus, OrderSummary};
use crate::activations::catalog::{CatalogStorage, PizzaSize};
use crate::activations::popularity::bump_pizza_popularity;
use crate::error::ServiceError;
use crate::storage::{
    decimal_from_column, decode_err, parse_id, timestamp_from_column, timestamp_to_column,
    uuid_from_column,
};
use crate::types::JsonColumn;

/// A validated, priced order line ready to be written
struct PricedItem {
    pizza_id: Uuid,
    pizza_name: String,
    size: PizzaSize,
    quantity: u32,
    toppings: Vec<String>,
    item_price: Decimal,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct ColumnValueError(String);

/// Owns the `orders`, `order_items` and `users` tables
#[derive(Clone)]
pub struct OrderLedger {
    pool: SqlitePool,
    catalog: CatalogStorage,
}

impl OrderLedger {
    pub fn new(pool: SqlitePool) -> Self {
        let catalog = CatalogStorage::new(pool.clone());
        Self { pool, catalog }
    }

    pub(super) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Validate, price and persist a new order
    ///
    /// Every item is validated and priced before the first write. The order
    /// row, its items, popularity bumps and the user upsert share one
    /// transaction.
    pub async fn place_order(
        &self,
        user_id: &str,
        items: Vec<OrderItemInput>,
        nickname: Option<String>,
    ) -> Result<Order, ServiceError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ServiceError::InvalidInput("userId must not be empty".into()));
        }
        if items.is_empty() {
            return Err(ServiceError::InvalidInput(
                "An order needs at least one item".into(),
            ));
        }

        let mut priced = Vec::with_capacity(items.len());
        for item in &items {
            priced.push(self.price_item(item).await?);
        }
        let total: Decimal = priced.iter().map(|item| item.item_price).sum();

        let order_id = Uuid::new_v4();
        let now = timestamp_to_column(Utc::now());
        let nickname = nickname.filter(|n| !n.trim().is_empty());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, user_id, nickname, status, total_price, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order_id.to_string())
        .bind(user_id)
        .bind(nickname.as_deref())
        .bind(OrderStatus::Pending.as_str())
        .bind(total.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for item in &priced {
            sqlx::query(
                "INSERT INTO order_items \
                 (id, order_id, pizza_id, pizza_name, size, quantity, toppings, item_price) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(order_id.to_string())
            .bind(item.pizza_id.to_string())
            .bind(&item.pizza_name)
            .bind(item.size.as_str())
            .bind(i64::from(item.quantity))
            .bind(JsonColumn::encode(&item.toppings)?)
            .bind(item.item_price.to_string())
            .execute(&mut *tx)
            .await?;

            bump_pizza_popularity(&mut *tx, item.pizza_id, item.quantity).await?;
        }

        sqlx::query("INSERT INTO users (id) VALUES (?) ON CONFLICT(id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            user_id = %user_id,
            items = priced.len(),
            total = %total,
            "Order placed"
        );

        self.get_order_by_id(&order_id.to_string()).await
    }

    async fn price_item(&self, item: &OrderItemInput) -> Result<PricedItem, ServiceError> {
        if item.quantity == 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must be at least 1".into(),
            ));
        }

        let pizza = self
            .catalog
            .pizza_by_id(&item.pizza_id)
            .await?
            .ok_or_else(|| ServiceError::PizzaNotFound(item.pizza_id.clone()))?;

        let invalid_size = || ServiceError::InvalidSize {
            size: item.size.clone(),
            pizza: pizza.name.clone(),
        };
        let size: PizzaSize = item.size.parse().map_err(|_| invalid_size())?;
        let base = pizza.price_for(size).ok_or_else(invalid_size)?;

        let mut toppings = Vec::with_capacity(item.toppings.len());
        let mut toppings_price = Decimal::ZERO;
        for topping_id in &item.toppings {
            match self.catalog.topping_by_id(topping_id).await? {
                Some(topping) => {
                    toppings_price += topping.price;
                    toppings.push(topping.id.to_string());
                }
                None => {
                    tracing::debug!(topping_id = %topping_id, "Ignoring unknown topping");
                }
            }
        }

        Ok(PricedItem {
            pizza_id: pizza.id,
            pizza_name: pizza.name,
            size,
            quantity: item.quantity,
            toppings,
            item_price: (base + toppings_price) * Decimal::from(item.quantity),
        })
    }

    /// Full order with its items in insertion order
    pub async fn get_order_by_id(&self, order_id: &str) -> Result<Order, ServiceError> {
        let not_found = || ServiceError::OrderNotFound(order_id.to_string());
        let id = parse_id(order_id).ok_or_else(not_found)?;

        let row = sqlx::query(
            "SELECT id, user_id, nickname, status, total_price, created_at, updated_at \
             FROM orders WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_found)?;
        let summary = row_to_summary(&row)?;

        let item_rows = sqlx::query(
            "SELECT id, order_id, pizza_id, pizza_name, size, quantity, toppings, item_price \
             FROM order_items WHERE order_id = ? ORDER BY rowid",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?;
        let items = item_rows
            .iter()
            .map(row_to_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order {
            id: summary.id,
            user_id: summary.user_id,
            nickname: summary.nickname,
            status: summary.status,
            total_price: summary.total_price,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            items,
        })
    }

    /// Cancel a pending order owned by `user_id`
    pub async fn delete_order(
        &self,
        order_id: &str,
        user_id: &str,
    ) -> Result<CancelledOrder, ServiceError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ServiceError::InvalidInput("userId must not be empty".into()));
        }

        let id = parse_id(order_id)
            .ok_or_else(|| ServiceError::OrderNotFound(order_id.to_string()))?;

        let result = sqlx::query(
            "UPDATE orders SET status = ?, updated_at = ? \
             WHERE id = ? AND user_id = ? AND status = ?",
        )
        .bind(OrderStatus::Cancelled.as_str())
        .bind(timestamp_to_column(Utc::now()))
        .bind(id.to_string())
        .bind(user_id)
        .bind(OrderStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            tracing::info!(order_id = %id, user_id = %user_id, "Order cancelled");
            return Ok(CancelledOrder {
                success: true,
                order_id: id,
                message: "Order cancelled successfully".to_string(),
            });
        }

        let (owner, status) = self
            .owner_and_status(id)
            .await?
            .ok_or_else(|| ServiceError::OrderNotFound(order_id.to_string()))?;

        if owner != user_id {
            return Err(ServiceError::NotAuthorized {
                order_id: id.to_string(),
            });
        }
        Err(ServiceError::CannotCancel {
            order_id: id.to_string(),
            status,
        })
    }

    /// Move an order to `next`, if its current status allows it
    pub async fn advance_order_status(
        &self,
        order_id: &str,
        next: OrderStatus,
    ) -> Result<Order, ServiceError> {
        let id = parse_id(order_id)
            .ok_or_else(|| ServiceError::OrderNotFound(order_id.to_string()))?;
        let allowed = OrderStatus::predecessors(next);

        if !allowed.is_empty() {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("UPDATE orders SET status = ");
            query
                .push_bind(next.as_str())
                .push(", updated_at = ")
                .push_bind(timestamp_to_column(Utc::now()))
                .push(" WHERE id = ")
                .push_bind(id.to_string())
                .push(" AND status IN (");
            let mut statuses = query.separated(", ");
            for status in &allowed {
                statuses.push_bind(status.as_str());
            }
            statuses.push_unseparated(")");

            let result = query.build().execute(&self.pool).await?;
            if result.rows_affected() == 1 {
                tracing::info!(order_id = %id, status = %next, "Order status advanced");
                return self.get_order_by_id(&id.to_string()).await;
            }
        }

        let (_, from) = self
            .owner_and_status(id)
            .await?
            .ok_or_else(|| ServiceError::OrderNotFound(order_id.to_string()))?;

        Err(ServiceError::InvalidTransition {
            order_id: id.to_string(),
            from,
            to: next,
        })
    }

    async fn owner_and_status(
        &self,
        id: Uuid,
    ) -> Result<Option<(String, OrderStatus)>, ServiceError> {
        let row = sqlx::query("SELECT user_id, status FROM orders WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let status: String = row.try_get("status")?;
                Ok(Some((row.try_get("user_id")?, status_from_column(&status)?)))
            }
            None => Ok(None),
        }
    }
}

// ============================================================================
// Row converters
// ============================================================================

fn status_from_column(raw: &str) -> Result<OrderStatus, sqlx::Error> {
    raw.parse()
        .map_err(|e: String| decode_err(ColumnValueError(e)))
}

pub(super) fn row_to_summary(row: &SqliteRow) -> Result<OrderSummary, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(OrderSummary {
        id: uuid_from_column(row.try_get("id")?)?,
        user_id: row.try_get("user_id")?,
        nickname: row.try_get("nickname")?,
        status: status_from_column(&status)?,
        total_price: decimal_from_column(row.try_get("total_price")?)?,
        created_at: timestamp_from_column(row.try_get("created_at")?)?,
        updated_at: timestamp_from_column(row.try_get("updated_at")?)?,
    })
}

fn row_to_item(row: &SqliteRow) -> Result<OrderItem, sqlx::Error> {
    let quantity: i64 = row.try_get("quantity")?;
    Ok(OrderItem {
        id: uuid_from_column(row.try_get("id")?)?,
        order_id: uuid_from_column(row.try_get("order_id")?)?,
        pizza_id: uuid_from_column(row.try_get("pizza_id")?)?,
        pizza_name: row.try_get("pizza_name")?,
        size: row.try_get("size")?,
        quantity: u32::try_from(quantity).map_err(decode_err)?,
        toppings: JsonColumn::decode(row.try_get("toppings")?),
        item_price: decimal_from_column(row.try_get("item_price")?)?,
    })
}
