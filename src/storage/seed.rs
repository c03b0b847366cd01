//! Demo catalog and sample users
//!
//! Seeding is idempotent: rows are matched on their natural keys (names,
//! offer codes, user ids) and existing rows are left alone, except that
//! category descriptions and sample user details are refreshed.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::timestamp_to_column;
use crate::activations::catalog::{PizzaSize, SizePrices, StoreHours};
use crate::types::JsonColumn;

/// Rows written by one seeding run
///
/// Category and sample user rows are refreshed on every run, so they always count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub categories: u64,
    pub toppings: u64,
    pub pizzas: u64,
    pub locations: u64,
    pub offers: u64,
    pub users: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Storage(#[from] sqlx::Error),

    #[error(transparent)]
    Encoding(#[from] serde_json::Error),
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Meats", "Premium meat toppings"),
    ("Vegetables", "Fresh vegetable toppings"),
    ("Cheeses", "Artisan cheese selections"),
    ("Sauces", "Signature sauces"),
    ("Premium", "Premium specialty toppings"),
];

/// (name, category, price in cents)
const TOPPINGS: &[(&str, &str, i64)] = &[
    ("Pepperoni", "Meats", 150),
    ("Italian Sausage", "Meats", 175),
    ("Bacon", "Meats", 200),
    ("Ham", "Meats", 150),
    ("Grilled Chicken", "Meats", 225),
    ("Anchovies", "Meats", 200),
    ("Meatballs", "Meats", 200),
    ("Mushrooms", "Vegetables", 100),
    ("Green Peppers", "Vegetables", 75),
    ("Red Onions", "Vegetables", 75),
    ("Black Olives", "Vegetables", 100),
    ("Fresh Tomatoes", "Vegetables", 100),
    ("Spinach", "Vegetables", 100),
    ("Jalapeños", "Vegetables", 75),
    ("Pineapple", "Vegetables", 100),
    ("Roasted Garlic", "Vegetables", 100),
    ("Artichoke Hearts", "Vegetables", 150),
    ("Sun-dried Tomatoes", "Vegetables", 150),
    ("Extra Mozzarella", "Cheeses", 150),
    ("Parmesan", "Cheeses", 125),
    ("Feta Cheese", "Cheeses", 150),
    ("Ricotta", "Cheeses", 150),
    ("Gorgonzola", "Cheeses", 175),
    ("Goat Cheese", "Cheeses", 200),
    ("Extra Marinara", "Sauces", 50),
    ("BBQ Sauce", "Sauces", 75),
    ("Alfredo Sauce", "Sauces", 100),
    ("Pesto", "Sauces", 125),
    ("Buffalo Sauce", "Sauces", 75),
    ("Truffle Oil", "Premium", 300),
    ("Prosciutto", "Premium", 350),
    ("Fresh Basil", "Premium", 100),
    ("Burrata", "Premium", 400),
];

/// (name, description, small price in cents, popularity)
///
/// Each size up costs three dollars more.
const PIZZAS: &[(&str, &str, i64, i64)] = &[
    ("Margherita", "Classic tomato sauce, fresh mozzarella, and basil", 999, 95),
    ("Pepperoni", "Loaded with premium pepperoni and melted mozzarella", 1099, 100),
    ("Hawaiian", "Ham, pineapple, and mozzarella - a tropical delight", 1199, 75),
    ("Supreme", "Pepperoni, sausage, mushrooms, peppers, onions, and olives", 1299, 90),
    ("BBQ Chicken", "Grilled chicken, BBQ sauce, red onions, and cilantro", 1299, 85),
    ("Meat Lovers", "Pepperoni, sausage, bacon, ham, and meatballs", 1399, 88),
    ("Veggie Delight", "Mushrooms, peppers, onions, tomatoes, olives, and spinach", 1199, 70),
    ("Four Cheese", "Mozzarella, parmesan, ricotta, and gorgonzola", 1199, 80),
    ("Buffalo Chicken", "Spicy buffalo chicken, blue cheese crumbles, celery", 1299, 78),
    ("White Pizza", "Alfredo sauce, ricotta, mozzarella, garlic, and spinach", 1199, 72),
    ("Truffle Mushroom", "Premium mushrooms, truffle oil, parmesan, and fresh herbs", 1499, 65),
    ("Mediterranean", "Feta, olives, tomatoes, red onion, and fresh oregano", 1299, 68),
];

struct SeedLocation {
    name: &'static str,
    address: &'static str,
    city: &'static str,
    state: &'static str,
    zip_code: &'static str,
    latitude: f64,
    longitude: f64,
    phone: &'static str,
    /// (weekday, friday/saturday, sunday)
    hours: (&'static str, &'static str, &'static str),
}

const LOCATIONS: &[SeedLocation] = &[
    SeedLocation {
        name: "ABC Pizza - Times Square",
        address: "1500 Broadway",
        city: "New York",
        state: "NY",
        zip_code: "10036",
        latitude: 40.7580,
        longitude: -73.9855,
        phone: "(212) 555-0100",
        hours: ("10:00-23:00", "10:00-24:00", "11:00-22:00"),
    },
    SeedLocation {
        name: "ABC Pizza - Brooklyn Heights",
        address: "120 Montague Street",
        city: "New York",
        state: "NY",
        zip_code: "11201",
        latitude: 40.6934,
        longitude: -73.9917,
        phone: "(718) 555-0101",
        hours: ("11:00-22:00", "11:00-23:00", "12:00-21:00"),
    },
    SeedLocation {
        name: "ABC Pizza - Downtown LA",
        address: "800 S Figueroa St",
        city: "Los Angeles",
        state: "CA",
        zip_code: "90017",
        latitude: 34.0472,
        longitude: -118.2618,
        phone: "(213) 555-0102",
        hours: ("10:00-22:00", "10:00-23:00", "11:00-21:00"),
    },
    SeedLocation {
        name: "ABC Pizza - Santa Monica",
        address: "401 Santa Monica Blvd",
        city: "Los Angeles",
        state: "CA",
        zip_code: "90401",
        latitude: 34.0195,
        longitude: -118.4912,
        phone: "(310) 555-0103",
        hours: ("10:00-22:00", "10:00-23:00", "11:00-21:00"),
    },
    SeedLocation {
        name: "ABC Pizza - Chicago Loop",
        address: "233 S Wacker Dr",
        city: "Chicago",
        state: "IL",
        zip_code: "60606",
        latitude: 41.8789,
        longitude: -87.6359,
        phone: "(312) 555-0104",
        hours: ("10:00-22:00", "10:00-23:00", "11:00-21:00"),
    },
    SeedLocation {
        name: "ABC Pizza - San Francisco",
        address: "1 Market St",
        city: "San Francisco",
        state: "CA",
        zip_code: "94105",
        latitude: 37.7941,
        longitude: -122.3950,
        phone: "(415) 555-0105",
        hours: ("10:00-22:00", "10:00-23:00", "11:00-21:00"),
    },
];

struct SeedOffer {
    title: String,
    description: String,
    discount_type: &'static str,
    discount_value: Decimal,
    min_order_amount: Decimal,
    code: String,
    valid_days: i64,
    location_id: Option<String>,
}

/// (id, name, email, city)
const USERS: &[(&str, &str, &str, &str)] = &[
    ("U123", "John Doe", "john@example.com", "New York"),
    ("U456", "Jane Smith", "jane@example.com", "Los Angeles"),
    ("U789", "Bob Johnson", "bob@example.com", "Chicago"),
];

/// Number of locations, in listing order, that get their own offer
const LOCATION_OFFERS: usize = 3;

/// Populate the demo catalog in a single transaction
pub async fn seed(pool: &SqlitePool) -> Result<SeedSummary, SeedError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for &(name, description) in CATEGORIES {
        let result = sqlx::query(
            "INSERT INTO topping_categories (id, name, description) VALUES (?, ?, ?) \
             ON CONFLICT(name) DO UPDATE SET description = excluded.description",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await?;
        summary.categories += result.rows_affected();
    }

    for &(name, category, cents) in TOPPINGS {
        let category_id = id_by_name(&mut tx, "topping_categories", category).await?;
        let result = sqlx::query(
            "INSERT INTO toppings (id, name, category_id, price, is_available) \
             VALUES (?, ?, ?, ?, 1) ON CONFLICT(name) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(category_id)
        .bind(Decimal::new(cents, 2).to_string())
        .execute(&mut *tx)
        .await?;
        summary.toppings += result.rows_affected();
    }

    for &(name, description, small_cents, popularity) in PIZZAS {
        let result = sqlx::query(
            "INSERT INTO pizzas (id, name, description, sizes, is_available, popularity_score) \
             VALUES (?, ?, ?, ?, 1, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(description)
        .bind(JsonColumn::encode(&size_prices(small_cents))?)
        .bind(popularity)
        .execute(&mut *tx)
        .await?;
        summary.pizzas += result.rows_affected();
    }

    let mut location_ids = Vec::with_capacity(LOCATIONS.len());
    for location in LOCATIONS {
        let result = sqlx::query(
            "INSERT INTO store_locations \
             (id, name, address, city, state, zip_code, latitude, longitude, phone, hours, is_active) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1) ON CONFLICT(name) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(location.name)
        .bind(location.address)
        .bind(location.city)
        .bind(location.state)
        .bind(location.zip_code)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(location.phone)
        .bind(JsonColumn::encode(&store_hours(location.hours))?)
        .execute(&mut *tx)
        .await?;
        summary.locations += result.rows_affected();

        let id = id_by_name(&mut tx, "store_locations", location.name).await?;
        location_ids.push((id, location.city));
    }

    let now = Utc::now();
    for offer in offers(&location_ids) {
        let valid_until = Duration::try_days(offer.valid_days).map(|days| now + days);
        let result = sqlx::query(
            "INSERT INTO offers (id, location_id, title, description, discount_type, \
             discount_value, min_order_amount, code, valid_from, valid_until, is_active) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1) ON CONFLICT(code) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(offer.location_id)
        .bind(offer.title)
        .bind(offer.description)
        .bind(offer.discount_type)
        .bind(offer.discount_value.to_string())
        .bind(offer.min_order_amount.to_string())
        .bind(offer.code)
        .bind(timestamp_to_column(now))
        .bind(valid_until.map(timestamp_to_column))
        .execute(&mut *tx)
        .await?;
        summary.offers += result.rows_affected();
    }

    for &(id, name, email, city) in USERS {
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, location_city) VALUES (?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, email = excluded.email, \
             location_city = excluded.location_city",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(city)
        .execute(&mut *tx)
        .await?;
        summary.users += result.rows_affected();
    }

    tx.commit().await?;
    tracing::info!(?summary, "Seeded demo data");
    Ok(summary)
}

async fn id_by_name(
    tx: &mut Transaction<'_, Sqlite>,
    table: &'static str,
    name: &str,
) -> Result<String, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT id FROM {table} WHERE name = ?"))
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;
    row.try_get("id")
}

fn size_prices(small_cents: i64) -> SizePrices {
    PizzaSize::ALL
        .into_iter()
        .zip(0i64..)
        .map(|(size, step)| (size, Decimal::new(small_cents + step * 300, 2)))
        .collect()
}

fn store_hours((weekday, weekend, sunday): (&str, &str, &str)) -> StoreHours {
    [
        ("monday", weekday),
        ("tuesday", weekday),
        ("wednesday", weekday),
        ("thursday", weekday),
        ("friday", weekend),
        ("saturday", weekend),
        ("sunday", sunday),
    ]
    .into_iter()
    .map(|(day, hours)| (day.to_string(), hours.to_string()))
    .collect()
}

fn offers(location_ids: &[(String, &str)]) -> Vec<SeedOffer> {
    let mut offers = vec![
        SeedOffer {
            title: "Welcome Offer - 20% Off First Order".into(),
            description: "New customers get 20% off their first pizza order!".into(),
            discount_type: "percentage",
            discount_value: Decimal::new(20, 0),
            min_order_amount: Decimal::ZERO,
            code: "WELCOME20".into(),
            valid_days: 365,
            location_id: None,
        },
        SeedOffer {
            title: "Family Deal - $10 Off Orders Over $50".into(),
            description: "Get $10 off when you order $50 or more".into(),
            discount_type: "fixed",
            discount_value: Decimal::new(10, 0),
            min_order_amount: Decimal::new(50, 0),
            code: "FAMILY10".into(),
            valid_days: 90,
            location_id: None,
        },
        SeedOffer {
            title: "Weekend Special - Buy One Get One Free".into(),
            description: "Order one large pizza, get the second one free! Valid on weekends only."
                .into(),
            discount_type: "buy_one_get_one",
            discount_value: Decimal::new(100, 0),
            min_order_amount: Decimal::ZERO,
            code: "BOGO".into(),
            valid_days: 30,
            location_id: None,
        },
    ];

    // Two of the first three locations share a city; keep codes unique by location order
    for (n, (id, city)) in location_ids.iter().take(LOCATION_OFFERS).enumerate() {
        let city_code: String = city
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        offers.push(SeedOffer {
            title: format!("{city} Special - 15% Off"),
            description: format!("Exclusive offer for our {city} customers!"),
            discount_type: "percentage",
            discount_value: Decimal::new(15, 0),
            min_order_amount: Decimal::ZERO,
            code: format!("{city_code}15-{}", n + 1),
            valid_days: 60,
            location_id: Some(id.clone()),
        });
    }

    offers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_prices_step() {
        let sizes = size_prices(999);
        assert_eq!(sizes[&PizzaSize::Small], Decimal::new(999, 2));
        assert_eq!(sizes[&PizzaSize::Medium], Decimal::new(1299, 2));
        assert_eq!(sizes[&PizzaSize::ExtraLarge], Decimal::new(1899, 2));
    }

    #[test]
    fn test_location_offer_codes_unique() {
        let ids: Vec<(String, &str)> = LOCATIONS
            .iter()
            .map(|l| (Uuid::new_v4().to_string(), l.city))
            .collect();
        let offers = offers(&ids);
        assert_eq!(offers.len(), 3 + LOCATION_OFFERS);

        let mut codes: Vec<&str> = offers.iter().map(|o| o.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), offers.len());
    }

    #[test]
    fn test_store_hours() {
        let hours = store_hours(("10:00-22:00", "10:00-23:00", "11:00-21:00"));
        assert_eq!(hours.len(), 7);
        assert_eq!(hours["friday"], "10:00-23:00");
    }
}
