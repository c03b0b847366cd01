use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::activations::catalog::Topping;

#[derive(Debug, Clone, Serialize)]
pub struct PopularTopping {
    pub id: Uuid,
    pub name: String,
    pub category_name: Option<String>,
    pub price: Decimal,
    /// Number of order items carrying this topping
    pub order_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularPizza {
    pub id: Uuid,
    pub name: String,
    pub popularity_score: i64,
}

/// Result of `get_popular_toppings`
///
/// Before any order history exists the ranking is empty and the plain
/// topping list is served instead.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PopularToppings {
    Ranked(Vec<PopularTopping>),
    Unranked(Vec<Topping>),
}

impl PopularToppings {
    pub fn len(&self) -> usize {
        match self {
            PopularToppings::Ranked(toppings) => toppings.len(),
            PopularToppings::Unranked(toppings) => toppings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, PopularToppings::Ranked(_))
    }
}
