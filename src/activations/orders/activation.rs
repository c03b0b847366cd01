use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::ledger::OrderLedger;
use super::query::OrderFilter;
use super::types::OrderItemInput;
use crate::registry::{parse_params, Activation, MethodSchemaInfo, RegistryError, ToolReply};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetOrdersInput {
    /// Only orders placed by this user
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    /// Comma-separated statuses, e.g. "pending,confirmed"
    #[serde(default)]
    pub status: Option<String>,
    /// Only orders created in the last `<n>m`, `<n>h` or `<n>d`
    #[serde(default)]
    pub last: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetOrderByIdInput {
    /// The order id
    pub id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PlaceOrderInput {
    /// Id of the user placing the order
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Pizzas to order; size defaults to medium and quantity to 1
    pub items: Vec<OrderItemInput>,
    /// Optional label such as "Sam's birthday"
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteOrderInput {
    /// Id of the order to cancel
    pub id: String,
    /// Id of the user that placed the order
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl From<GetOrdersInput> for OrderFilter {
    fn from(input: GetOrdersInput) -> Self {
        OrderFilter {
            user_id: input.user_id,
            status: input.status,
            last: input.last,
        }
    }
}

/// Order placement, lookup and cancellation
#[derive(Clone)]
pub struct Orders {
    ledger: OrderLedger,
}

impl Orders {
    pub fn new(ledger: OrderLedger) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Activation for Orders {
    fn namespace(&self) -> &str {
        "orders"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "Place, list and cancel pizza orders"
    }

    fn methods(&self) -> Vec<MethodSchemaInfo> {
        vec![
            MethodSchemaInfo::new::<GetOrdersInput>(
                "get_orders",
                "List up to 100 orders, newest first, filtered by user, status or recency",
            ),
            MethodSchemaInfo::new::<GetOrderByIdInput>(
                "get_order_by_id",
                "Get an order with all of its items, status, total and timestamps",
            ),
            MethodSchemaInfo::new::<PlaceOrderInput>(
                "place_order",
                "Place a new order and return it with its id, items and total price",
            ),
            MethodSchemaInfo::new::<DeleteOrderInput>(
                "delete_order_by_id",
                "Cancel a pending order; only the user who placed it may cancel it",
            ),
        ]
    }

    async fn call(&self, method: &str, params: Value) -> Result<ToolReply, RegistryError> {
        match method {
            "get_orders" => {
                let input: GetOrdersInput = parse_params(params)?;
                ToolReply::from_result(self.ledger.get_orders(&input.into()).await)
            }
            "get_order_by_id" => {
                let input: GetOrderByIdInput = parse_params(params)?;
                ToolReply::from_result(self.ledger.get_order_by_id(&input.id).await)
            }
            "place_order" => {
                let input: PlaceOrderInput = parse_params(params)?;
                let result = self
                    .ledger
                    .place_order(&input.user_id, input.items, input.nickname)
                    .await;
                ToolReply::from_result(result)
            }
            "delete_order_by_id" => {
                let input: DeleteOrderInput = parse_params(params)?;
                ToolReply::from_result(self.ledger.delete_order(&input.id, &input.user_id).await)
            }
            other => Err(RegistryError::ToolNotFound(other.to_string())),
        }
    }
}
