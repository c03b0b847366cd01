mod activation;
mod ledger;
mod query;
mod types;

pub use activation::{
    DeleteOrderInput, GetOrderByIdInput, GetOrdersInput, Orders, PlaceOrderInput,
};
pub use ledger::OrderLedger;
pub use query::{parse_recency_window, parse_status_filter, OrderFilter, MAX_ORDERS};
pub use types::{
    CancelledOrder, Order, OrderItem, OrderItemInput, OrderStatus, OrderSummary,
};
