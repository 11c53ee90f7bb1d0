//! Thin interface to one EVM chain's escrow contract. Real chains would
//! implement this over an `alloy`-based RPC client; [`MockChainClient`]
//! backs it with an in-memory [`EscrowLedger`] plus the replay guards its
//! idempotency contract requires.

use alloy_primitives::Address;
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;

use orderbook::{NetworkId, OrderId, TradeId};

use crate::error::EscrowError;
use crate::ledger::{Balance, EscrowLedger};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscrowSnapshot {
    pub total: Decimal,
    pub available: Decimal,
    pub locked: Decimal,
}

impl From<Balance> for EscrowSnapshot {
    fn from(b: Balance) -> Self {
        Self {
            total: b.total,
            available: b.available(),
            locked: b.locked,
        }
    }
}

/// Both legs of a same-chain trade, resolved to one chain's token addresses.
///
/// `trade_id` is the idempotency key: one taker admission can produce
/// several trades against different makers, all sharing `order_id`, so
/// dedup must happen per trade rather than per order.
#[derive(Clone, Debug)]
pub struct SameChainSettlement {
    pub order_id: OrderId,
    pub trade_id: TradeId,
    pub base_token: Address,
    pub quote_token: Address,
    pub base_amount: Decimal,
    pub quote_amount: Decimal,
    pub ask_account: Address,
    pub ask_receive_wallet: Address,
    pub bid_account: Address,
    pub bid_receive_wallet: Address,
}

/// One leg of a cross-chain trade, resolved to the chain it targets. Keyed
/// the same way as [`SameChainSettlement`]: by `trade_id`, not `order_id`.
#[derive(Clone, Debug)]
pub struct CrossLegSettlement {
    pub order_id: OrderId,
    pub trade_id: TradeId,
    pub token: Address,
    pub amount: Decimal,
    pub sender: Address,
    pub receiver_wallet: Address,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailureReport {
    /// True iff the opposite leg for this `order_id` had already settled —
    /// the asymmetric-settlement condition.
    pub asymmetric: bool,
}

/// One instance per supported chain. Every write is
/// idempotent per `(order_id, chain_id)`; `chain_id()` supplies the second
/// half of that key implicitly since each client only ever speaks for one
/// chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn chain_id(&self) -> NetworkId;

    async fn escrow_of(&self, user: Address, token: Address) -> EscrowSnapshot;

    async fn lock(
        &self,
        user: Address,
        token: Address,
        amount: Decimal,
        order_id: OrderId,
    ) -> Result<(), EscrowError>;

    async fn settle_same_chain(&self, settlement: &SameChainSettlement) -> Result<(), EscrowError>;

    async fn settle_cross_leg(
        &self,
        leg: &CrossLegSettlement,
        is_source: bool,
    ) -> Result<(), EscrowError>;

    async fn report_failure(&self, trade_id: TradeId, is_source: bool, reason: &str) -> FailureReport;

    async fn emergency_refund(&self, leg: &CrossLegSettlement) -> Result<(), EscrowError>;
}

/// In-memory stand-in for a real RPC-backed client. Used by the demo binary
/// and by settlement's own tests; production deployments would swap this
/// for an `alloy`-based client without changing the orchestrator.
pub struct MockChainClient {
    chain_id: NetworkId,
    ledger: EscrowLedger,
    locks: DashMap<OrderId, ()>,
    settled_same: DashMap<TradeId, ()>,
    settled_legs: DashMap<(TradeId, bool), ()>,
}

impl MockChainClient {
    pub fn new(chain_id: NetworkId) -> Self {
        Self {
            chain_id,
            ledger: EscrowLedger::new(),
            locks: DashMap::new(),
            settled_same: DashMap::new(),
            settled_legs: DashMap::new(),
        }
    }

    /// Test/demo convenience: credits a user's `total` balance directly,
    /// standing in for an on-chain `depositToEscrow` call.
    pub fn seed_deposit(&self, user: Address, token: Address, amount: Decimal) -> Result<(), EscrowError> {
        self.ledger.credit(user, token, amount)
    }

    fn leg_already_settled(&self, trade_id: TradeId, is_source: bool) -> bool {
        self.settled_legs.contains_key(&(trade_id, is_source))
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn chain_id(&self) -> NetworkId {
        self.chain_id
    }

    async fn escrow_of(&self, user: Address, token: Address) -> EscrowSnapshot {
        self.ledger.balance_of(user, token).into()
    }

    async fn lock(
        &self,
        user: Address,
        token: Address,
        amount: Decimal,
        order_id: OrderId,
    ) -> Result<(), EscrowError> {
        if self.locks.contains_key(&order_id) {
            return Ok(());
        }
        self.ledger.lock(user, token, amount)?;
        self.locks.insert(order_id, ());
        Ok(())
    }

    async fn settle_same_chain(&self, settlement: &SameChainSettlement) -> Result<(), EscrowError> {
        if self.settled_same.contains_key(&settlement.trade_id) {
            return Ok(());
        }
        self.ledger.settle_debit(
            settlement.ask_account,
            settlement.base_token,
            settlement.base_amount,
        )?;
        self.ledger.settle_debit(
            settlement.bid_account,
            settlement.quote_token,
            settlement.quote_amount,
        )?;
        self.ledger
            .credit(settlement.bid_receive_wallet, settlement.base_token, settlement.base_amount)?;
        self.ledger
            .credit(settlement.ask_receive_wallet, settlement.quote_token, settlement.quote_amount)?;
        self.settled_same.insert(settlement.trade_id, ());
        Ok(())
    }

    async fn settle_cross_leg(
        &self,
        leg: &CrossLegSettlement,
        is_source: bool,
    ) -> Result<(), EscrowError> {
        let key = (leg.trade_id, is_source);
        if self.settled_legs.contains_key(&key) {
            return Ok(());
        }
        self.ledger.settle_debit(leg.sender, leg.token, leg.amount)?;
        self.ledger.credit(leg.receiver_wallet, leg.token, leg.amount)?;
        self.settled_legs.insert(key, ());
        Ok(())
    }

    async fn report_failure(&self, trade_id: TradeId, is_source: bool, reason: &str) -> FailureReport {
        tracing::warn!(?trade_id, is_source, reason, chain = ?self.chain_id, "settlement leg failed");
        FailureReport {
            asymmetric: self.leg_already_settled(trade_id, !is_source),
        }
    }

    async fn emergency_refund(&self, leg: &CrossLegSettlement) -> Result<(), EscrowError> {
        self.ledger.credit(leg.sender, leg.token, leg.amount)?;
        // The receiver was credited via `credit` in `settle_cross_leg`, not
        // locked, so reversing it is a plain available-balance withdrawal,
        // not a `settle_debit` (which requires a lock that was never taken).
        self.ledger.withdraw(leg.receiver_wallet, leg.token, leg.amount)?;
        Ok(())
    }
}
