//! Settlement orchestrator: chooses same-chain vs cross-chain dispatch
//! for each matched trade and drives it to a terminal state.
//!
//! Cross-chain asymmetry is detected by the orchestrator itself — it holds
//! both legs' results from the same `join!`, so it never needs to ask a
//! chain client whether "the other side" settled. A single [`ChainClient`]
//! only ever speaks for its own chain and has no visibility into another
//! chain's state.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use dashmap::DashMap;
use rust_decimal::Decimal;

use escrow::{ChainClient, CrossLegSettlement, SameChainSettlement};
use orderbook::{NetworkId, OrderId, Party, Side, Trade, TradeId};

use crate::error::SettlementError;
use crate::record::{LegStatus, SettlementRecord, SettlementState};

/// Resolves a symbol's base/quote token addresses on a given chain.
/// Implemented by the exchange service from its per-symbol configuration.
pub trait TokenResolver: Send + Sync {
    fn resolve(&self, symbol: &str, network: NetworkId) -> Option<(Address, Address)>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementPath {
    SameChain,
    CrossChain,
}

#[derive(Clone, Debug)]
pub struct SettlementInfo {
    pub trade_id: TradeId,
    pub path: SettlementPath,
    pub state: SettlementState,
}

pub struct SettlementOrchestrator {
    chains: DashMap<NetworkId, Arc<dyn ChainClient>>,
    records: DashMap<TradeId, SettlementRecord>,
    max_retries: u32,
    base_backoff: Duration,
}

impl SettlementOrchestrator {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            chains: DashMap::new(),
            records: DashMap::new(),
            max_retries,
            base_backoff,
        }
    }

    pub fn register_chain(&self, client: Arc<dyn ChainClient>) {
        self.chains.insert(client.chain_id(), client);
    }

    fn chain(&self, id: NetworkId) -> Result<Arc<dyn ChainClient>, SettlementError> {
        self.chains
            .get(&id)
            .map(|c| c.clone())
            .ok_or(SettlementError::UnknownChain(id))
    }

    pub fn record(&self, trade_id: TradeId) -> Option<SettlementRecord> {
        self.records.get(&trade_id).map(|r| r.clone())
    }

    /// Pre-admission escrow check: the submitter must hold
    /// at least `required` available on `network`.
    pub async fn check_escrow(
        &self,
        account: Address,
        token: Address,
        network: NetworkId,
        required: Decimal,
    ) -> Result<(), SettlementError> {
        let chain = self.chain(network)?;
        let snapshot = chain.escrow_of(account, token).await;
        if snapshot.available < required {
            return Err(SettlementError::InsufficientEscrow {
                available: snapshot.available,
                required,
            });
        }
        Ok(())
    }

    /// Locks the submitter's escrow for an admitted order. Idempotent per
    /// `order_id` at the chain client.
    pub async fn lock_escrow(
        &self,
        account: Address,
        token: Address,
        network: NetworkId,
        amount: Decimal,
        order_id: OrderId,
    ) -> Result<(), SettlementError> {
        let chain = self.chain(network)?;
        chain.lock(account, token, amount, order_id).await?;
        Ok(())
    }

    fn ask_bid(trade: &Trade) -> (Party, Party) {
        if trade.maker.side == Side::Ask {
            (trade.maker, trade.taker)
        } else {
            (trade.taker, trade.maker)
        }
    }

    fn set_state(&self, trade_id: TradeId, state: SettlementState) {
        if let Some(mut record) = self.records.get_mut(&trade_id) {
            record.state = state;
        }
    }

    /// Retries `op` with exponential backoff up to `max_retries` times
    /// beyond the first attempt.
    async fn with_retry<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        let mut backoff = self.base_backoff;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    /// Dispatches a matched trade to the appropriate settlement path and
    /// drives it to a terminal state, returning the initial dispatch
    /// summary; final state is queried separately.
    pub async fn dispatch_trade(
        &self,
        trade: &Trade,
        resolver: &dyn TokenResolver,
    ) -> Result<SettlementInfo, SettlementError> {
        if trade.is_same_chain() {
            self.dispatch_same_chain(trade, resolver).await
        } else {
            self.dispatch_cross_chain(trade, resolver).await
        }
    }

    async fn dispatch_same_chain(
        &self,
        trade: &Trade,
        resolver: &dyn TokenResolver,
    ) -> Result<SettlementInfo, SettlementError> {
        let network = trade.maker.from_network;
        let (base_token, quote_token) = resolver.resolve(&trade.symbol, network).ok_or_else(|| {
            SettlementError::UnknownToken {
                symbol: trade.symbol.clone(),
                network,
            }
        })?;
        let (ask, bid) = Self::ask_bid(trade);

        let settlement = SameChainSettlement {
            order_id: trade.taker.order_id,
            trade_id: trade.trade_id,
            base_token,
            quote_token,
            base_amount: trade.quantity,
            quote_amount: trade.quantity * trade.price,
            ask_account: ask.account,
            ask_receive_wallet: ask.receive_wallet,
            bid_account: bid.account,
            bid_receive_wallet: bid.receive_wallet,
        };
        self.records.insert(
            trade.trade_id,
            SettlementRecord::new_same_chain(trade.trade_id, trade.taker.order_id),
        );

        let chain = self.chain(network)?;
        match self.with_retry(|| chain.settle_same_chain(&settlement)).await {
            Ok(()) => self.set_state(trade.trade_id, SettlementState::Settled),
            Err(err) => {
                chain
                    .report_failure(trade.trade_id, true, &err.to_string())
                    .await;
                self.set_state(trade.trade_id, SettlementState::Abandoned);
            }
        }

        Ok(SettlementInfo {
            trade_id: trade.trade_id,
            path: SettlementPath::SameChain,
            state: self
                .record(trade.trade_id)
                .map(|r| r.state)
                .unwrap_or(SettlementState::Abandoned),
        })
    }

    async fn dispatch_cross_chain(
        &self,
        trade: &Trade,
        resolver: &dyn TokenResolver,
    ) -> Result<SettlementInfo, SettlementError> {
        let (ask, bid) = Self::ask_bid(trade);

        let (ask_base_token, _) = resolver
            .resolve(&trade.symbol, ask.from_network)
            .ok_or_else(|| SettlementError::UnknownToken {
                symbol: trade.symbol.clone(),
                network: ask.from_network,
            })?;
        let (_, bid_quote_token) = resolver
            .resolve(&trade.symbol, bid.from_network)
            .ok_or_else(|| SettlementError::UnknownToken {
                symbol: trade.symbol.clone(),
                network: bid.from_network,
            })?;

        let source_leg = CrossLegSettlement {
            order_id: trade.taker.order_id,
            trade_id: trade.trade_id,
            token: ask_base_token,
            amount: trade.quantity,
            sender: ask.account,
            receiver_wallet: bid.receive_wallet,
        };
        let dest_leg = CrossLegSettlement {
            order_id: trade.taker.order_id,
            trade_id: trade.trade_id,
            token: bid_quote_token,
            amount: trade.quantity * trade.price,
            sender: bid.account,
            receiver_wallet: ask.receive_wallet,
        };

        self.records.insert(
            trade.trade_id,
            SettlementRecord::new_cross_chain(trade.trade_id, trade.taker.order_id),
        );

        let source_chain = self.chain(ask.from_network)?;
        let dest_chain = self.chain(bid.from_network)?;

        let (source_result, dest_result) = tokio::join!(
            self.with_retry(|| source_chain.settle_cross_leg(&source_leg, true)),
            self.with_retry(|| dest_chain.settle_cross_leg(&dest_leg, false)),
        );

        match (source_result, dest_result) {
            (Ok(()), Ok(())) => {
                self.set_state(trade.trade_id, SettlementState::Settled);
            }
            (Ok(()), Err(err)) => {
                dest_chain
                    .report_failure(trade.trade_id, false, &err.to_string())
                    .await;
                self.refund_settled_leg(trade.trade_id, &source_chain, &source_leg)
                    .await;
            }
            (Err(err), Ok(())) => {
                source_chain
                    .report_failure(trade.trade_id, true, &err.to_string())
                    .await;
                self.refund_settled_leg(trade.trade_id, &dest_chain, &dest_leg)
                    .await;
            }
            (Err(_), Err(_)) => {
                self.set_state(trade.trade_id, SettlementState::Abandoned);
            }
        }

        Ok(SettlementInfo {
            trade_id: trade.trade_id,
            path: SettlementPath::CrossChain,
            state: self
                .record(trade.trade_id)
                .map(|r| r.state)
                .unwrap_or(SettlementState::Abandoned),
        })
    }

    /// Reverses the leg that settled when its counterpart permanently
    /// failed — the asymmetric-settlement recovery path.
    async fn refund_settled_leg(
        &self,
        trade_id: TradeId,
        settled_chain: &Arc<dyn ChainClient>,
        settled_leg: &CrossLegSettlement,
    ) {
        self.set_state(trade_id, SettlementState::AsymmetricDetected);
        match self
            .with_retry(|| settled_chain.emergency_refund(settled_leg))
            .await
        {
            Ok(()) => self.set_state(trade_id, SettlementState::Refunded),
            Err(_) => self.set_state(trade_id, SettlementState::Abandoned),
        }
    }
}
