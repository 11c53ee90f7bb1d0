use thiserror::Error;

use crate::types::OrderId;

/// Errors surfaced synchronously by book admission and lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("order {0:?} not found")]
    NotFound(OrderId),
    #[error("price is not a multiple of the configured tick size")]
    TickMismatch,
    #[error("quantity must be positive and at least the symbol minimum")]
    InvalidQuantity,
    #[error("limit orders require a price")]
    MissingPrice,
}
