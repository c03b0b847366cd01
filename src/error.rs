//! Domain error types
//!
//! Every catalog, ledger and query operation fails with a [`ServiceError`].
//! Callers at the tool boundary turn it into a [`ErrorPayload`] instead of
//! a transport failure.

use serde::Serialize;

use crate::activations::orders::OrderStatus;

/// Broad failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    NotAuthorized,
    InvalidStateTransition,
    TransactionFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Pizza not found: {0}")]
    PizzaNotFound(String),

    #[error("Topping not found: {0}")]
    ToppingNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid size '{size}' for pizza {pizza}")]
    InvalidSize { size: String, pizza: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User not authorized to cancel order {order_id}")]
    NotAuthorized { order_id: String },

    #[error("Order cannot be cancelled (status: {status})")]
    CannotCancel { order_id: String, status: OrderStatus },

    #[error("Invalid status transition for order {order_id}: {from} -> {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Encoding failure: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::PizzaNotFound(_)
            | ServiceError::ToppingNotFound(_)
            | ServiceError::OrderNotFound(_) => ErrorKind::NotFound,
            ServiceError::InvalidSize { .. } | ServiceError::InvalidInput(_) => {
                ErrorKind::InvalidInput
            }
            ServiceError::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            ServiceError::CannotCancel { .. } | ServiceError::InvalidTransition { .. } => {
                ErrorKind::InvalidStateTransition
            }
            ServiceError::Storage(_) | ServiceError::Encoding(_) => ErrorKind::TransactionFailure,
        }
    }

    /// Machine-readable code carried in error payloads
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::PizzaNotFound(_) => "PIZZA_NOT_FOUND",
            ServiceError::ToppingNotFound(_) => "TOPPING_NOT_FOUND",
            ServiceError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            ServiceError::InvalidSize { .. } => "INVALID_SIZE",
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
            ServiceError::NotAuthorized { .. } => "NOT_AUTHORIZED",
            ServiceError::CannotCancel { .. } => "CANNOT_CANCEL",
            ServiceError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ServiceError::Storage(_) | ServiceError::Encoding(_) => "TRANSACTION_FAILURE",
        }
    }

    /// Human-readable message safe to hand back to a caller
    ///
    /// Storage-level details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::TransactionFailure => "The operation could not be completed".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Structured failure returned to tool callers
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ErrorPayload {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
        }
    }
}

impl From<&ServiceError> for ErrorPayload {
    fn from(e: &ServiceError) -> Self {
        if e.kind() == ErrorKind::TransactionFailure {
            tracing::error!(error = %e, "Storage operation failed");
        }
        ErrorPayload::new(e.code(), e.public_message())
    }
}
