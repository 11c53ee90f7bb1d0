//! Cross-chain settlement orchestration: dispatches matched trades to
//! same-chain or cross-chain settlement paths and drives each to a
//! terminal state, independent of the HTTP request that admitted the order.

pub mod error;
pub mod orchestrator;
pub mod record;

pub use error::SettlementError;
pub use orchestrator::{SettlementInfo, SettlementOrchestrator, SettlementPath, TokenResolver};
pub use record::{LegStatus, SettlementRecord, SettlementState};
