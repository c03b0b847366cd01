//! Integration tests for filtered order listings

mod common;

use abc_pizza_mcp::activations::orders::{
    OrderFilter, OrderItemInput, OrderLedger, OrderStatus, OrderSummary,
};
use abc_pizza_mcp::Database;
use chrono::{Duration, Utc};
use common::{pizza_id, seeded_db};
use uuid::Uuid;

async fn place(ledger: &OrderLedger, db: &Database, user_id: &str) -> Uuid {
    let margherita = pizza_id(db, "Margherita").await;
    ledger
        .place_order(user_id, vec![OrderItemInput::new(margherita, "large", 1)], None)
        .await
        .expect("Order should be placed")
        .id
}

async fn backdate(db: &Database, id: Uuid, age: Duration) {
    sqlx::query("UPDATE orders SET created_at = ? WHERE id = ?")
        .bind((Utc::now() - age).timestamp_millis())
        .bind(id.to_string())
        .execute(db.pool())
        .await
        .expect("Backdating should succeed");
}

fn ids(orders: &[OrderSummary]) -> Vec<Uuid> {
    orders.iter().map(|order| order.id).collect()
}

fn filter(status: Option<&str>, last: Option<&str>) -> OrderFilter {
    OrderFilter {
        user_id: None,
        status: status.map(str::to_string),
        last: last.map(str::to_string),
    }
}

#[tokio::test]
async fn test_status_filter() {
    let t = seeded_db().await;
    let ledger = OrderLedger::new(t.db.pool().clone());

    let pending = place(&ledger, &t.db, "U123").await;
    let confirmed = place(&ledger, &t.db, "U123").await;
    let preparing = place(&ledger, &t.db, "U456").await;
    let cancelled = place(&ledger, &t.db, "U456").await;

    ledger
        .advance_order_status(&confirmed.to_string(), OrderStatus::Confirmed)
        .await
        .unwrap();
    ledger
        .advance_order_status(&preparing.to_string(), OrderStatus::Preparing)
        .await
        .unwrap();
    ledger
        .delete_order(&cancelled.to_string(), "U456")
        .await
        .unwrap();

    let orders = ledger
        .get_orders(&filter(Some("pending,confirmed"), None))
        .await
        .unwrap();

    let mut found = ids(&orders);
    found.sort();
    let mut expected = vec![pending, confirmed];
    expected.sort();
    assert_eq!(found, expected);
    assert!(orders
        .iter()
        .all(|o| matches!(o.status, OrderStatus::Pending | OrderStatus::Confirmed)));

    let orders = ledger
        .get_orders(&filter(Some(" CANCELLED "), None))
        .await
        .unwrap();
    assert_eq!(ids(&orders), vec![cancelled]);
}

#[tokio::test]
async fn test_recency_window() {
    let t = seeded_db().await;
    let ledger = OrderLedger::new(t.db.pool().clone());

    let old = place(&ledger, &t.db, "U123").await;
    let recent = place(&ledger, &t.db, "U123").await;
    backdate(&t.db, old, Duration::hours(3)).await;
    backdate(&t.db, recent, Duration::minutes(30)).await;

    let orders = ledger.get_orders(&filter(None, Some("2h"))).await.unwrap();
    assert_eq!(ids(&orders), vec![recent]);

    let orders = ledger.get_orders(&filter(None, Some("1d"))).await.unwrap();
    assert_eq!(ids(&orders), vec![recent, old]);

    let orders = ledger.get_orders(&filter(None, Some("10m"))).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn test_unrecognized_window_is_ignored() {
    let t = seeded_db().await;
    let ledger = OrderLedger::new(t.db.pool().clone());

    let old = place(&ledger, &t.db, "U123").await;
    place(&ledger, &t.db, "U456").await;
    backdate(&t.db, old, Duration::days(30)).await;

    let unfiltered = ledger.get_orders(&OrderFilter::default()).await.unwrap();
    let bogus = ledger
        .get_orders(&filter(None, Some("bogus")))
        .await
        .unwrap();

    assert_eq!(unfiltered.len(), 2);
    assert_eq!(ids(&bogus), ids(&unfiltered));
}

#[tokio::test]
async fn test_user_filter_newest_first() {
    let t = seeded_db().await;
    let ledger = OrderLedger::new(t.db.pool().clone());

    let first = place(&ledger, &t.db, "U123").await;
    place(&ledger, &t.db, "U456").await;
    let second = place(&ledger, &t.db, "U123").await;
    backdate(&t.db, first, Duration::minutes(5)).await;

    let orders = ledger
        .get_orders(&OrderFilter {
            user_id: Some("U123".to_string()),
            ..OrderFilter::default()
        })
        .await
        .unwrap();

    assert_eq!(ids(&orders), vec![second, first]);
    assert!(orders.iter().all(|o| o.user_id == "U123"));
}

#[tokio::test]
async fn test_filters_combine() {
    let t = seeded_db().await;
    let ledger = OrderLedger::new(t.db.pool().clone());

    let keep = place(&ledger, &t.db, "U123").await;
    let stale = place(&ledger, &t.db, "U123").await;
    let other_user = place(&ledger, &t.db, "U789").await;
    backdate(&t.db, stale, Duration::days(2)).await;

    let orders = ledger
        .get_orders(&OrderFilter {
            user_id: Some("U123".to_string()),
            status: Some("pending".to_string()),
            last: Some("1d".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(ids(&orders), vec![keep]);
    assert!(!ids(&orders).contains(&other_user));
}

#[tokio::test]
async fn test_oversized_window_keeps_everything() {
    let t = seeded_db().await;
    let ledger = OrderLedger::new(t.db.pool().clone());

    let old = place(&ledger, &t.db, "U123").await;
    let recent = place(&ledger, &t.db, "U456").await;
    backdate(&t.db, old, Duration::days(365)).await;

    for last in ["100000000d", "200000000000m"] {
        let orders = ledger
            .get_orders(&filter(None, Some(last)))
            .await
            .unwrap_or_else(|e| panic!("Window {last} should not fail: {e}"));
        assert_eq!(ids(&orders), vec![recent, old], "{last}");
    }
}
