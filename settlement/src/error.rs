use rust_decimal::Decimal;
use thiserror::Error;

use orderbook::{NetworkId, TradeId};

/// Errors surfaced by the settlement orchestrator, layered above the
/// chain-client errors it wraps.
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("account lacks sufficient escrow: available {available}, required {required}")]
    InsufficientEscrow { available: Decimal, required: Decimal },
    #[error("no token address configured for {symbol} on network {network:?}")]
    UnknownToken { symbol: String, network: NetworkId },
    #[error("no chain client registered for network {0:?}")]
    UnknownChain(NetworkId),
    #[error("settlement for trade {0:?} abandoned after {1} attempts")]
    Abandoned(TradeId, u32),
    #[error(transparent)]
    Escrow(#[from] escrow::EscrowError),
}
