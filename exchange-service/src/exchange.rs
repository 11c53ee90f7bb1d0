//! The book registry and per-request admission pipeline: chooses
//! same-chain vs cross-chain book by `(fromNetwork, toNetwork)`, runs the
//! escrow pre-check, invokes the engine, then dispatches settlement.
//!
//! Each symbol's two books are guarded by their own `tokio::sync::Mutex` —
//! admission and match run as a single critical section under that lock;
//! creating a book for a symbol seen for the first time takes a short lock
//! on the registry's `DashMap` shard, never two book locks at once.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use dashmap::DashMap;
use orderbook::decimal::symbol_of;
use orderbook::{BookSnapshot, MatchingConfig, NetworkId, NewOrder, Order, OrderBook, OrderId, OrderType, Side, Trade};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use escrow::{ChainClient, EscrowSnapshot, MockChainClient};
use settlement::{SettlementInfo, SettlementOrchestrator, SettlementPath, TokenResolver};

use crate::config::{Config, SymbolConfig};
use crate::error::AppError;

/// Resolves `(symbol, network) -> (base_token, quote_token)` from the
/// service's static per-symbol configuration.
struct ConfigResolver {
    symbols: HashMap<String, SymbolConfig>,
}

impl TokenResolver for ConfigResolver {
    fn resolve(&self, symbol: &str, network: NetworkId) -> Option<(Address, Address)> {
        self.symbols.get(symbol)?.tokens.get(&network).copied()
    }
}

/// One symbol's two venues: orders whose `fromNetwork ==
/// toNetwork` land in `same_chain`; everything else lands in `cross_chain`.
struct SymbolBooks {
    same_chain: Mutex<OrderBook>,
    cross_chain: Mutex<OrderBook>,
}

/// Result of routing + admitting one order: which book it landed in, plus
/// everything the caller needs to build a response and dispatch settlement.
pub struct Admission {
    pub order_id: OrderId,
    pub trades: Vec<Trade>,
}

pub struct Exchange {
    config: Config,
    books: DashMap<String, Arc<SymbolBooks>>,
    chains: HashMap<NetworkId, Arc<MockChainClient>>,
    orchestrator: Arc<SettlementOrchestrator>,
    resolver: Arc<ConfigResolver>,
}

impl Exchange {
    pub fn new(config: Config) -> Self {
        let orchestrator = Arc::new(SettlementOrchestrator::new(
            config.settlement.max_retries,
            config.settlement.base_backoff,
        ));
        let mut chains = HashMap::with_capacity(config.chains.len());
        for chain_cfg in &config.chains {
            let client = Arc::new(MockChainClient::new(chain_cfg.chain_id));
            orchestrator.register_chain(client.clone());
            chains.insert(chain_cfg.chain_id, client);
        }
        let resolver = Arc::new(ConfigResolver {
            symbols: config.symbols.clone(),
        });

        Self {
            config,
            books: DashMap::new(),
            chains,
            orchestrator,
            resolver,
        }
    }

    pub fn symbol_config(&self, symbol: &str) -> Option<&SymbolConfig> {
        self.config.symbols.get(symbol)
    }

    /// Test/demo convenience standing in for an on-chain `depositToEscrow`
    /// call, so integration tests can fund accounts before admitting orders.
    pub fn seed_deposit(
        &self,
        network: NetworkId,
        user: Address,
        token: Address,
        amount: Decimal,
    ) -> Result<(), AppError> {
        let chain = self
            .chains
            .get(&network)
            .ok_or_else(|| AppError::Validation(format!("unknown network {network:?}")))?;
        chain
            .seed_deposit(user, token, amount)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn symbol_books(&self, symbol: &str) -> Result<Arc<SymbolBooks>, AppError> {
        let cfg = self
            .config
            .symbols
            .get(symbol)
            .ok_or_else(|| AppError::Validation(format!("unknown symbol {symbol:?}")))?;
        if let Some(existing) = self.books.get(symbol) {
            return Ok(existing.clone());
        }
        let entry = self.books.entry(symbol.to_string()).or_insert_with(|| {
            Arc::new(SymbolBooks {
                same_chain: Mutex::new(OrderBook::new(symbol, cfg.tick, MatchingConfig::default())),
                cross_chain: Mutex::new(OrderBook::new(symbol, cfg.tick, MatchingConfig::default())),
            })
        });
        Ok(entry.clone())
    }

    fn chain(&self, network: NetworkId) -> Result<&Arc<MockChainClient>, AppError> {
        self.chains
            .get(&network)
            .ok_or_else(|| AppError::Validation(format!("unknown network {network:?}")))
    }

    /// Token address and amount the submitter must have available on
    /// `from_network` before admission. Market bids estimate
    /// the quote cost from the opposing book's current depth.
    async fn required_escrow(
        &self,
        books: &SymbolBooks,
        cfg: &SymbolConfig,
        new: &NewOrder,
    ) -> Result<(Address, Decimal), AppError> {
        let (base_token, quote_token) = cfg
            .tokens
            .get(&new.from_network)
            .copied()
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "no token addresses configured for {:?} on {:?}",
                    cfg.symbol, new.from_network
                ))
            })?;

        match new.side {
            Side::Ask => Ok((base_token, new.quantity)),
            Side::Bid => match new.kind {
                OrderType::Limit => {
                    let price = new
                        .price
                        .ok_or_else(|| AppError::Validation("limit orders require a price".into()))?;
                    Ok((quote_token, new.quantity * price))
                }
                OrderType::Market => {
                    let venue = if new.from_network == new.to_network {
                        &books.same_chain
                    } else {
                        &books.cross_chain
                    };
                    let estimate = venue.lock().await.market_cost_estimate(Side::Bid, new.quantity);
                    Ok((quote_token, estimate))
                }
            },
        }
    }

    /// Admits a new order end to end: escrow pre-check, match, lock and
    /// dispatch settlement for every trade produced. `cross_chain` selects
    /// which HTTP endpoint called this and is validated against the
    /// order's own networks.
    pub async fn register_order(
        &self,
        new: NewOrder,
        cross_chain: bool,
    ) -> Result<(Admission, Vec<SettlementInfo>), AppError> {
        let symbol = symbol_of(&new.base_asset, &new.quote_asset);
        let cfg = self
            .config
            .symbols
            .get(&symbol)
            .ok_or_else(|| AppError::Validation(format!("unknown symbol {symbol:?}")))?
            .clone();
        let books = self.symbol_books(&symbol)?;

        let (token, required) = self.required_escrow(&books, &cfg, &new).await?;
        self.orchestrator
            .check_escrow(new.account, token, new.from_network, required)
            .await?;

        let venue = if cross_chain { &books.cross_chain } else { &books.same_chain };
        let timestamp = now_nanos();
        let (order_id, trades) = {
            let mut book = venue.lock().await;
            match new.kind {
                OrderType::Limit => {
                    let (id, trades, _remainder) = book.process_limit(new.clone(), timestamp)?;
                    (id, trades)
                }
                OrderType::Market => {
                    let (id, trades, unfilled) = book.process_market(new.clone(), timestamp)?;
                    if unfilled > Decimal::ZERO {
                        info!(order_id = ?id, %unfilled, "market order left unfilled quantity");
                    }
                    (id, trades)
                }
            }
        };

        if let Err(err) = self
            .orchestrator
            .lock_escrow(new.account, token, new.from_network, required, order_id)
            .await
        {
            warn!(?err, order_id = ?order_id, "post-match escrow lock failed after pre-check passed");
        }

        let mut settlements = Vec::with_capacity(trades.len());
        for trade in &trades {
            match self.orchestrator.dispatch_trade(trade, self.resolver.as_ref()).await {
                Ok(info) => settlements.push(info),
                Err(err) => {
                    warn!(?err, trade_id = ?trade.trade_id, "settlement dispatch failed");
                    settlements.push(SettlementInfo {
                        trade_id: trade.trade_id,
                        path: if trade.is_same_chain() {
                            SettlementPath::SameChain
                        } else {
                            SettlementPath::CrossChain
                        },
                        state: settlement::SettlementState::Abandoned,
                    });
                }
            }
        }

        Ok((Admission { order_id, trades }, settlements))
    }

    pub async fn cancel_order(&self, symbol: &str, cross_chain: bool, order_id: OrderId) -> Result<(), AppError> {
        let books = self.symbol_books(symbol)?;
        let venue = if cross_chain { &books.cross_chain } else { &books.same_chain };
        let mut book = venue.lock().await;
        book.cancel(order_id)?;
        Ok(())
    }

    pub async fn snapshot(&self, symbol: &str, cross_chain: bool) -> Result<BookSnapshot, AppError> {
        let books = self.symbol_books(symbol)?;
        let venue = if cross_chain { &books.cross_chain } else { &books.same_chain };
        Ok(venue.lock().await.snapshot(None))
    }

    pub async fn order(&self, symbol: &str, cross_chain: bool, order_id: OrderId) -> Result<Order, AppError> {
        let books = self.symbol_books(symbol)?;
        let venue = if cross_chain { &books.cross_chain } else { &books.same_chain };
        venue
            .lock()
            .await
            .order(order_id)
            .ok_or_else(|| AppError::NotFound(format!("order {order_id:?}")))
    }

    pub async fn best_order(&self, symbol: &str, cross_chain: bool, side: Side) -> Result<(Option<Decimal>, Option<Decimal>), AppError> {
        let books = self.symbol_books(symbol)?;
        let venue = if cross_chain { &books.cross_chain } else { &books.same_chain };
        let book = venue.lock().await;
        let price = match side {
            Side::Bid => book.best_bid(),
            Side::Ask => book.best_ask(),
        };
        let snapshot = book.snapshot(Some(1));
        let quantity = match side {
            Side::Bid => snapshot.bids.first().map(|(_, q)| *q),
            Side::Ask => snapshot.asks.first().map(|(_, q)| *q),
        };
        Ok((price, quantity))
    }

    pub async fn tape(&self, symbol: &str, cross_chain: bool, limit: usize) -> Result<Vec<Trade>, AppError> {
        let books = self.symbol_books(symbol)?;
        let venue = if cross_chain { &books.cross_chain } else { &books.same_chain };
        Ok(venue.lock().await.tape(limit))
    }

    pub async fn check_funds(&self, network: NetworkId, account: Address, token: Address) -> Result<EscrowSnapshot, AppError> {
        let chain = self.chain(network)?;
        Ok(chain.escrow_of(account, token).await)
    }

    pub fn settlement_address(&self, network: NetworkId) -> Result<Address, AppError> {
        self.config
            .chains
            .iter()
            .find(|c| c.chain_id == network)
            .map(|c| c.settlement_address)
            .ok_or_else(|| AppError::Validation(format!("unknown network {network:?}")))
    }
}

fn now_nanos() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}
