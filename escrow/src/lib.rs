//! Off-chain escrow view and chain-client abstraction.
//!
//! The authoritative balances live on-chain; this crate mirrors them for
//! synchronous pre-checks and provides the write path the settlement
//! orchestrator drives. [`ledger::EscrowLedger`] is the raw balance store;
//! [`chain::ChainClient`] is the per-chain interface that wraps it with the
//! idempotency guards settlement correctness requires.

pub mod chain;
pub mod error;
pub mod ledger;

pub use chain::{
    ChainClient, CrossLegSettlement, EscrowSnapshot, FailureReport, MockChainClient,
    SameChainSettlement,
};
pub use error::EscrowError;
pub use ledger::{Balance, EscrowLedger};
