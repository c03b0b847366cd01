//! Read-only catalog queries

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::types::{MenuSummary, Offer, Pizza, StoreLocation, Topping, ToppingCategory};
use crate::storage::{
    decimal_from_column, decode_err, parse_id, timestamp_from_column, uuid_from_column,
};
use crate::types::JsonColumn;

const PIZZA_COLUMNS: &str =
    "id, name, description, sizes, image_url, is_available, popularity_score";

const TOPPING_SELECT: &str = "SELECT t.id, t.name, t.category_id, tc.name AS category_name, \
     t.price, t.is_available \
     FROM toppings t LEFT JOIN topping_categories tc ON t.category_id = tc.id";

const LOCATION_COLUMNS: &str = "id, name, address, city, state, zip_code, country, \
     latitude, longitude, phone, hours, is_active";

const OFFER_COLUMNS: &str = "id, location_id, title, description, discount_type, \
     discount_value, min_order_amount, code, valid_from, valid_until, is_active";

/// Catalog access over the shared pool
#[derive(Clone)]
pub struct CatalogStorage {
    pool: SqlitePool,
}

impl CatalogStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Pizzas
    // ========================================================================

    /// Available pizzas, most popular first
    pub async fn pizzas(&self) -> Result<Vec<Pizza>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {PIZZA_COLUMNS} FROM pizzas WHERE is_available = 1 \
             ORDER BY popularity_score DESC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| self.row_to_pizza(row)).collect()
    }

    /// Any pizza by id, available or not
    pub async fn pizza_by_id(&self, id: &str) -> Result<Option<Pizza>, sqlx::Error> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query(&format!("SELECT {PIZZA_COLUMNS} FROM pizzas WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_pizza(&row)).transpose()
    }

    // ========================================================================
    // Toppings
    // ========================================================================

    /// Available toppings, optionally restricted to one category (case-insensitive)
    pub async fn toppings(&self, category: Option<&str>) -> Result<Vec<Topping>, sqlx::Error> {
        let rows = match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => {
                sqlx::query(&format!(
                    "{TOPPING_SELECT} WHERE t.is_available = 1 AND LOWER(tc.name) = LOWER(?) \
                     ORDER BY tc.name, t.name"
                ))
                .bind(category.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "{TOPPING_SELECT} WHERE t.is_available = 1 ORDER BY tc.name, t.name"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(|row| self.row_to_topping(row)).collect()
    }

    pub async fn topping_by_id(&self, id: &str) -> Result<Option<Topping>, sqlx::Error> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query(&format!("{TOPPING_SELECT} WHERE t.id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_topping(&row)).transpose()
    }

    pub async fn topping_categories(&self) -> Result<Vec<ToppingCategory>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, name, description FROM topping_categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(ToppingCategory {
                    id: uuid_from_column(row.try_get("id")?)?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                })
            })
            .collect()
    }

    // ========================================================================
    // Store locations
    // ========================================================================

    /// Active locations, optionally those whose city contains `city`
    pub async fn store_locations(
        &self,
        city: Option<&str>,
    ) -> Result<Vec<StoreLocation>, sqlx::Error> {
        let rows = match city.map(str::trim).filter(|c| !c.is_empty()) {
            Some(city) => {
                sqlx::query(&format!(
                    "SELECT {LOCATION_COLUMNS} FROM store_locations \
                     WHERE is_active = 1 AND LOWER(city) LIKE LOWER(?) ORDER BY name"
                ))
                .bind(format!("%{city}%"))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {LOCATION_COLUMNS} FROM store_locations \
                     WHERE is_active = 1 ORDER BY city, name"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(|row| self.row_to_location(row)).collect()
    }

    // ========================================================================
    // Offers
    // ========================================================================

    /// Offers that are active and valid right now
    ///
    /// With a location, only that location's offers plus global ones
    /// (`location_id IS NULL`); without one, every active offer.
    pub async fn active_offers(&self, location_id: Option<&str>) -> Result<Vec<Offer>, sqlx::Error> {
        self.active_offers_at(location_id, Utc::now()).await
    }

    pub async fn active_offers_at(
        &self,
        location_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Offer>, sqlx::Error> {
        let rows = match location_id.map(str::trim).filter(|l| !l.is_empty()) {
            Some(raw) => {
                // A malformed id cannot match a location, but global offers still apply
                let location = parse_id(raw).map(|id| id.to_string());
                sqlx::query(&format!(
                    "SELECT {OFFER_COLUMNS} FROM offers \
                     WHERE is_active = 1 AND (location_id IS NULL OR location_id = ?)"
                ))
                .bind(location)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {OFFER_COLUMNS} FROM offers WHERE is_active = 1"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut offers = rows
            .iter()
            .map(|row| self.row_to_offer(row))
            .collect::<Result<Vec<_>, _>>()?;
        offers.retain(|offer| offer.is_valid_at(now));
        offers.sort_by(|a, b| b.discount_value.cmp(&a.discount_value));
        Ok(offers)
    }

    // ========================================================================
    // Summary
    // ========================================================================

    pub async fn menu_summary(&self) -> Result<MenuSummary, sqlx::Error> {
        let row = sqlx::query(
            "SELECT \
               (SELECT COUNT(*) FROM pizzas WHERE is_available = 1) AS pizzas_count, \
               (SELECT COUNT(*) FROM toppings WHERE is_available = 1) AS toppings_count, \
               (SELECT COUNT(*) FROM topping_categories) AS categories_count, \
               (SELECT COUNT(*) FROM store_locations WHERE is_active = 1) AS locations_count",
        )
        .fetch_one(&self.pool)
        .await?;

        let active_offers_count = self.active_offers(None).await?.len() as i64;

        Ok(MenuSummary {
            pizzas_count: row.try_get("pizzas_count")?,
            toppings_count: row.try_get("toppings_count")?,
            categories_count: row.try_get("categories_count")?,
            active_offers_count,
            locations_count: row.try_get("locations_count")?,
        })
    }

    // ========================================================================
    // Row converters
    // ========================================================================

    pub(crate) fn row_to_pizza(&self, row: &SqliteRow) -> Result<Pizza, sqlx::Error> {
        Ok(Pizza {
            id: uuid_from_column(row.try_get("id")?)?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            sizes: JsonColumn::decode(row.try_get("sizes")?),
            image_url: row.try_get("image_url")?,
            is_available: row.try_get("is_available")?,
            popularity_score: row.try_get("popularity_score")?,
        })
    }

    pub(crate) fn row_to_topping(&self, row: &SqliteRow) -> Result<Topping, sqlx::Error> {
        let category_id: Option<String> = row.try_get("category_id")?;
        Ok(Topping {
            id: uuid_from_column(row.try_get("id")?)?,
            name: row.try_get("name")?,
            category_id: category_id.as_deref().map(uuid_from_column).transpose()?,
            category_name: row.try_get("category_name")?,
            price: decimal_from_column(row.try_get("price")?)?,
            is_available: row.try_get("is_available")?,
        })
    }

    fn row_to_location(&self, row: &SqliteRow) -> Result<StoreLocation, sqlx::Error> {
        Ok(StoreLocation {
            id: uuid_from_column(row.try_get("id")?)?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            zip_code: row.try_get("zip_code")?,
            country: row.try_get("country")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            phone: row.try_get("phone")?,
            hours: JsonColumn::decode(row.try_get("hours")?),
            is_active: row.try_get("is_active")?,
        })
    }

    fn row_to_offer(&self, row: &SqliteRow) -> Result<Offer, sqlx::Error> {
        let location_id: Option<String> = row.try_get("location_id")?;
        let discount_type: String = row.try_get("discount_type")?;
        let valid_until: Option<i64> = row.try_get("valid_until")?;

        Ok(Offer {
            id: uuid_from_column(row.try_get("id")?)?,
            location_id: location_id.as_deref().map(uuid_from_column).transpose()?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            discount_type: discount_type
                .parse()
                .map_err(|e: String| decode_err(std::io::Error::other(e)))?,
            discount_value: decimal_from_column(row.try_get("discount_value")?)?,
            min_order_amount: decimal_from_column(row.try_get("min_order_amount")?)?,
            code: row.try_get("code")?,
            valid_from: timestamp_from_column(row.try_get("valid_from")?)?,
            valid_until: valid_until.map(timestamp_from_column).transpose()?,
            is_active: row.try_get("is_active")?,
        })
    }
}

