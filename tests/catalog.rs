//! Integration tests for catalog lookups and popularity rankings

mod common;

use abc_pizza_mcp::activations::catalog::{CatalogStorage, DiscountType, PizzaSize};
use abc_pizza_mcp::activations::orders::{OrderItemInput, OrderLedger};
use abc_pizza_mcp::activations::popularity::{Popularity, PopularityStorage, PopularToppings};
use common::{location_id, pizza_id, seeded_db, topping_id};
use rust_decimal::Decimal;

// =============================================================================
// Menu
// =============================================================================

#[tokio::test]
async fn test_pizzas_most_popular_first() {
    let t = seeded_db().await;
    let catalog = CatalogStorage::new(t.db.pool().clone());

    let pizzas = catalog.pizzas().await.unwrap();
    assert_eq!(pizzas.len(), 12);

    let names: Vec<&str> = pizzas.iter().take(3).map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Pepperoni", "Margherita", "Supreme"]);
    assert!(pizzas
        .windows(2)
        .all(|pair| pair[0].popularity_score >= pair[1].popularity_score));

    let margherita = &pizzas[1];
    assert_eq!(margherita.price_for(PizzaSize::Small), Some(Decimal::new(999, 2)));
    assert_eq!(margherita.price_for(PizzaSize::Large), Some(Decimal::new(1599, 2)));
}

#[tokio::test]
async fn test_unavailable_pizza_hidden_from_menu() {
    let t = seeded_db().await;
    let catalog = CatalogStorage::new(t.db.pool().clone());
    let hawaiian = pizza_id(&t.db, "Hawaiian").await;

    sqlx::query("UPDATE pizzas SET is_available = 0 WHERE id = ?")
        .bind(&hawaiian)
        .execute(t.db.pool())
        .await
        .unwrap();

    let pizzas = catalog.pizzas().await.unwrap();
    assert_eq!(pizzas.len(), 11);
    assert!(pizzas.iter().all(|p| p.name != "Hawaiian"));

    let pizza = catalog.pizza_by_id(&hawaiian).await.unwrap();
    assert!(pizza.is_some_and(|p| !p.is_available), "Lookup by id still finds it");
}

#[tokio::test]
async fn test_lookup_by_malformed_id() {
    let t = seeded_db().await;
    let catalog = CatalogStorage::new(t.db.pool().clone());

    assert!(catalog.pizza_by_id("not-a-uuid").await.unwrap().is_none());
    assert!(catalog.topping_by_id("").await.unwrap().is_none());
    assert!(catalog
        .topping_by_id("11111111-2222-4333-8444-555555555555")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_toppings_by_category() {
    let t = seeded_db().await;
    let catalog = CatalogStorage::new(t.db.pool().clone());

    let all = catalog.toppings(None).await.unwrap();
    assert_eq!(all.len(), 33);

    let vegetables = catalog.toppings(Some("vEgEtAbLeS")).await.unwrap();
    assert!(!vegetables.is_empty());
    assert!(vegetables
        .iter()
        .all(|t| t.category_name.as_deref() == Some("Vegetables")));

    assert!(catalog.toppings(Some("Desserts")).await.unwrap().is_empty());
    assert_eq!(catalog.toppings(Some("  ")).await.unwrap().len(), 33);

    let pepperoni = topping_id(&t.db, "Pepperoni").await;
    let topping = catalog.topping_by_id(&pepperoni).await.unwrap().unwrap();
    assert_eq!(topping.price, Decimal::new(150, 2));
    assert_eq!(topping.category_name.as_deref(), Some("Meats"));
}

#[tokio::test]
async fn test_topping_categories() {
    let t = seeded_db().await;
    let catalog = CatalogStorage::new(t.db.pool().clone());

    let names: Vec<String> = catalog
        .topping_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Cheeses", "Meats", "Premium", "Sauces", "Vegetables"]);
}

// =============================================================================
// Locations and offers
// =============================================================================

#[tokio::test]
async fn test_store_locations_city_substring() {
    let t = seeded_db().await;
    let catalog = CatalogStorage::new(t.db.pool().clone());

    assert_eq!(catalog.store_locations(None).await.unwrap().len(), 6);

    let new_york = catalog.store_locations(Some("york")).await.unwrap();
    assert_eq!(new_york.len(), 2);
    assert!(new_york.iter().all(|l| l.city == "New York"));

    let sf = catalog.store_locations(Some("San Fran")).await.unwrap();
    assert_eq!(sf.len(), 1);
    let hours = sf[0].hours.decoded().expect("Seeded hours are valid JSON");
    assert_eq!(hours.get("monday").map(String::as_str), Some("10:00-22:00"));

    assert!(catalog.store_locations(Some("Boston")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_active_offers_by_location() {
    let t = seeded_db().await;
    let catalog = CatalogStorage::new(t.db.pool().clone());
    let times_square = location_id(&t.db, "ABC Pizza - Times Square").await;
    let chicago = location_id(&t.db, "ABC Pizza - Chicago Loop").await;

    let all = catalog.active_offers(None).await.unwrap();
    assert_eq!(all.len(), 6);

    let local = catalog.active_offers(Some(&times_square)).await.unwrap();
    assert_eq!(local.len(), 4);
    assert!(local.iter().all(|o| match o.location_id {
        Some(id) => id.to_string() == times_square,
        None => true,
    }));
    assert!(local
        .windows(2)
        .all(|pair| pair[0].discount_value >= pair[1].discount_value));
    assert_eq!(local[0].discount_type, DiscountType::BuyOneGetOne);

    let global_only = catalog.active_offers(Some(&chicago)).await.unwrap();
    assert_eq!(global_only.len(), 3);
    assert!(global_only.iter().all(|o| o.location_id.is_none()));

    let malformed = catalog.active_offers(Some("nowhere")).await.unwrap();
    assert_eq!(malformed.len(), 3);
}

#[tokio::test]
async fn test_expired_and_inactive_offers_hidden() {
    let t = seeded_db().await;
    let catalog = CatalogStorage::new(t.db.pool().clone());

    sqlx::query("UPDATE offers SET valid_until = 0 WHERE code = 'WELCOME20'")
        .execute(t.db.pool())
        .await
        .unwrap();
    sqlx::query("UPDATE offers SET is_active = 0 WHERE code = 'BOGO'")
        .execute(t.db.pool())
        .await
        .unwrap();

    let offers = catalog.active_offers(None).await.unwrap();
    assert_eq!(offers.len(), 4);
    assert!(offers
        .iter()
        .all(|o| !matches!(o.code.as_deref(), Some("WELCOME20" | "BOGO"))));
}

#[tokio::test]
async fn test_menu_summary_counts() {
    let t = seeded_db().await;
    let catalog = CatalogStorage::new(t.db.pool().clone());

    let summary = catalog.menu_summary().await.unwrap();
    assert_eq!(summary.pizzas_count, 12);
    assert_eq!(summary.toppings_count, 33);
    assert_eq!(summary.categories_count, 5);
    assert_eq!(summary.active_offers_count, 6);
    assert_eq!(summary.locations_count, 6);
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let t = seeded_db().await;
    let again = t.db.seed().await.expect("Reseeding should succeed");

    assert_eq!(again.pizzas, 0);
    assert_eq!(again.toppings, 0);
    assert_eq!(again.offers, 0);

    let catalog = CatalogStorage::new(t.db.pool().clone());
    assert_eq!(catalog.pizzas().await.unwrap().len(), 12);
}

// =============================================================================
// Popularity
// =============================================================================

fn popularity(t: &common::TestDb) -> Popularity {
    Popularity::new(
        PopularityStorage::new(t.db.pool().clone()),
        CatalogStorage::new(t.db.pool().clone()),
    )
}

#[tokio::test]
async fn test_popular_toppings_fallback_without_history() {
    let t = seeded_db().await;

    let toppings = popularity(&t).popular_toppings(5).await.unwrap();

    assert!(!toppings.is_ranked());
    assert_eq!(toppings.len(), 5);
    let json = serde_json::to_value(&toppings).unwrap();
    assert!(json.is_array(), "Fallback serializes as a plain list");
    assert!(json[0].get("order_count").is_none());
}

#[tokio::test]
async fn test_popular_toppings_ranked_by_order_items() {
    let t = seeded_db().await;
    let ledger = OrderLedger::new(t.db.pool().clone());
    let margherita = pizza_id(&t.db, "Margherita").await;
    let mushrooms = topping_id(&t.db, "Mushrooms").await;
    let pepperoni = topping_id(&t.db, "Pepperoni").await;

    ledger
        .place_order(
            "U123",
            vec![
                OrderItemInput::new(&margherita, "large", 1)
                    .with_toppings([mushrooms.clone(), pepperoni]),
                OrderItemInput::new(&margherita, "small", 4).with_toppings([mushrooms]),
            ],
            None,
        )
        .await
        .unwrap();

    let toppings = popularity(&t).popular_toppings(10).await.unwrap();
    let PopularToppings::Ranked(ranked) = toppings else {
        panic!("Order history should produce a ranking");
    };

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].name, "Mushrooms");
    assert_eq!(ranked[0].order_count, 2);
    assert_eq!(ranked[1].name, "Pepperoni");
    assert_eq!(ranked[1].order_count, 1);
}

#[tokio::test]
async fn test_popular_pizzas_follow_orders() {
    let t = seeded_db().await;
    let ledger = OrderLedger::new(t.db.pool().clone());
    let truffle = pizza_id(&t.db, "Truffle Mushroom").await;

    ledger
        .place_order("U123", vec![OrderItemInput::new(&truffle, "large", 50)], None)
        .await
        .unwrap();

    let ranked = PopularityStorage::new(t.db.pool().clone())
        .popular_pizzas(3)
        .await
        .unwrap();
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].name, "Truffle Mushroom");
    assert_eq!(ranked[0].popularity_score, 115);
}
