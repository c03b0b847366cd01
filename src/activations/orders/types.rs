use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::JsonColumn;

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Position along the fulfilment path; `None` for `Cancelled`
    fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether an order in `self` may move to `next`
    ///
    /// Fulfilment only moves forward (steps may be skipped). Cancellation is
    /// only possible while pending. Terminal states never change.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            (_, None) => self == OrderStatus::Pending,
            (None, _) => false,
        }
    }

    /// Every status from which `next` is reachable in one step
    pub fn predecessors(next: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|from| from.can_transition_to(next))
            .collect()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown order status '{s}'"))
    }
}

fn default_size() -> String {
    "medium".to_string()
}

fn default_quantity() -> u32 {
    1
}

/// One line of a `place_order` request
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OrderItemInput {
    /// Id of the pizza to order
    pub pizza_id: String,
    /// small, medium, large or extra-large
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Topping ids; unknown ids are ignored
    #[serde(default)]
    pub toppings: Vec<String>,
}

impl OrderItemInput {
    pub fn new(pizza_id: impl Into<String>, size: impl Into<String>, quantity: u32) -> Self {
        Self {
            pizza_id: pizza_id.into(),
            size: size.into(),
            quantity,
            toppings: Vec::new(),
        }
    }

    pub fn with_toppings<I, S>(mut self, toppings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.toppings = toppings.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub pizza_id: Uuid,
    pub pizza_name: String,
    pub size: String,
    pub quantity: u32,
    pub toppings: JsonColumn<Vec<String>>,
    pub item_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub nickname: Option<String>,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// An order row without its items, as returned by listings
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: Uuid,
    pub user_id: String,
    pub nickname: Option<String>,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelledOrder {
    pub success: bool,
    pub order_id: Uuid,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Ready));
        assert!(Preparing.can_transition_to(Delivered));
        assert!(!Ready.can_transition_to(Preparing));
        assert!(!Confirmed.can_transition_to(Confirmed));
    }

    #[test]
    fn test_cancel_only_from_pending() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Cancelled));
        assert_eq!(OrderStatus::predecessors(Cancelled), vec![Pending]);
    }

    #[test]
    fn test_terminal_states() {
        use OrderStatus::*;
        for next in OrderStatus::ALL {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(OrderStatus::predecessors(Pending).is_empty());
    }

    #[test]
    fn test_status_text() {
        assert_eq!(" Confirmed ".parse::<OrderStatus>(), Ok(OrderStatus::Confirmed));
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"preparing\""
        );
    }

    #[test]
    fn test_item_input_defaults() {
        let item: OrderItemInput = serde_json::from_str(r#"{"pizza_id":"p1"}"#).unwrap();
        assert_eq!(item.size, "medium");
        assert_eq!(item.quantity, 1);
        assert!(item.toppings.is_empty());
    }
}
