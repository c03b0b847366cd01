//! Catalog types: pizzas, toppings, locations and offers

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::JsonColumn;

/// The fixed set of pizza sizes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum PizzaSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl PizzaSize {
    pub const ALL: [PizzaSize; 4] = [
        PizzaSize::Small,
        PizzaSize::Medium,
        PizzaSize::Large,
        PizzaSize::ExtraLarge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PizzaSize::Small => "small",
            PizzaSize::Medium => "medium",
            PizzaSize::Large => "large",
            PizzaSize::ExtraLarge => "extra-large",
        }
    }
}

impl fmt::Display for PizzaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PizzaSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        PizzaSize::ALL
            .into_iter()
            .find(|size| size.as_str() == normalized)
            .ok_or_else(|| format!("unknown pizza size '{s}'"))
    }
}

/// Size name -> price, as stored in `pizzas.sizes`
pub type SizePrices = BTreeMap<PizzaSize, Decimal>;

/// Day name -> opening hours, as stored in `store_locations.hours`
pub type StoreHours = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize)]
pub struct Pizza {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sizes: JsonColumn<SizePrices>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub popularity_score: i64,
}

impl Pizza {
    /// Base price for `size`, if the pizza is sold in that size
    pub fn price_for(&self, size: PizzaSize) -> Option<Decimal> {
        self.sizes.decoded()?.get(&size).copied()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToppingCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Topping {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub price: Decimal,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreLocation {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub hours: JsonColumn<StoreHours>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
    BuyOneGetOne,
}

impl DiscountType {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
            DiscountType::BuyOneGetOne => "buy_one_get_one",
        }
    }
}

impl FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            "buy_one_get_one" => Ok(DiscountType::BuyOneGetOne),
            other => Err(format!("unknown discount type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Offer {
    pub id: Uuid,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_amount: Decimal,
    pub code: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Offer {
    /// Whether `at` falls inside the offer's validity window
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && self.valid_until.map_or(true, |until| until >= at)
    }
}

/// Counts reported by `get_menu_summary`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuSummary {
    pub pizzas_count: i64,
    pub toppings_count: i64,
    pub categories_count: i64,
    pub active_offers_count: i64,
    pub locations_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_parse() {
        assert_eq!("large".parse::<PizzaSize>(), Ok(PizzaSize::Large));
        assert_eq!(" Extra-Large ".parse::<PizzaSize>(), Ok(PizzaSize::ExtraLarge));
        assert!("huge".parse::<PizzaSize>().is_err());
    }

    #[test]
    fn test_size_prices_json_keys() {
        let mut sizes = SizePrices::new();
        sizes.insert(PizzaSize::ExtraLarge, Decimal::new(1899, 2));
        let json = serde_json::to_string(&sizes).unwrap();
        assert!(json.starts_with(r#"{"extra-large":"#));

        let decoded: SizePrices = serde_json::from_str(r#"{"small":9.99,"large":15.99}"#).unwrap();
        assert_eq!(decoded[&PizzaSize::Large], Decimal::new(1599, 2));
    }

    #[test]
    fn test_price_for_raw_sizes() {
        let pizza = Pizza {
            id: Uuid::new_v4(),
            name: "Broken".into(),
            description: None,
            sizes: JsonColumn::Raw("n/a".into()),
            image_url: None,
            is_available: true,
            popularity_score: 0,
        };
        assert_eq!(pizza.price_for(PizzaSize::Medium), None);
    }
}
