use rust_decimal::Decimal;
use thiserror::Error;

use orderbook::OrderId;

/// Errors raised by the escrow ledger and chain client.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EscrowError {
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("available balance {available} is less than requested {amount}")]
    InsufficientAvailable { available: Decimal, amount: Decimal },
    #[error("lock already exists for order {0:?} on this chain")]
    AlreadyLocked(OrderId),
    #[error("no lock found for order {0:?} on this chain")]
    LockNotFound(OrderId),
}
