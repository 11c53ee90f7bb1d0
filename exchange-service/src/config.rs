//! Runtime configuration: per-chain RPC/operator settings and per-symbol
//! token/tick configuration, layered with `config` + `dotenvy` — a TOML
//! file overridden by `XCHAIN_`-prefixed environment variables.

use std::collections::HashMap;
use std::str::FromStr;

use alloy_primitives::Address;
use orderbook::decimal::TickConfig;
use orderbook::NetworkId;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid address {value:?} for {context}")]
    InvalidAddress { context: String, value: String },
    #[error("invalid decimal {value:?} for {context}")]
    InvalidDecimal { context: String, value: String },
    #[error("duplicate symbol {0:?} in configuration")]
    DuplicateSymbol(String),
    #[error("settlement contract address on chain {chain_id} equals a configured token address")]
    SettlementAddressEqualsToken { chain_id: u64 },
    #[error("symbol {symbol:?} has no token addresses configured for chain {chain_id}")]
    MissingTokenAddress { symbol: String, chain_id: u64 },
}

#[derive(Debug, Clone, Deserialize)]
struct RawChain {
    chain_id: u64,
    rpc_url: String,
    settlement_address: String,
    operator_key: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawTokens {
    base_token: String,
    quote_token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSymbol {
    base_asset: String,
    quote_asset: String,
    tick_size: String,
    min_quantity: String,
    /// Keyed by chain id as a decimal string (TOML table keys are strings).
    tokens: HashMap<String, RawTokens>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSettlement {
    max_retries: u32,
    base_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    bind_address: String,
    chains: Vec<RawChain>,
    symbols: Vec<RawSymbol>,
    settlement: RawSettlement,
}

/// Per-chain settings the service needs at startup: RPC URL, chain id,
/// settlement contract address, operator key. The operator key's `Debug`
/// impl is redacted — it must never reach a log line.
#[derive(Clone)]
pub struct ChainConfig {
    pub chain_id: NetworkId,
    pub rpc_url: String,
    pub settlement_address: Address,
    pub operator_key: String,
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("settlement_address", &self.settlement_address)
            .field("operator_key", &"<redacted>")
            .finish()
    }
}

/// Per-symbol trading rules and token-address resolution: base/quote
/// addresses per supported chain, decimals, tick size, minimum quantity.
#[derive(Clone, Debug)]
pub struct SymbolConfig {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub tick: TickConfig,
    /// `chain -> (base_token, quote_token)`.
    pub tokens: HashMap<NetworkId, (Address, Address)>,
}

#[derive(Clone, Debug)]
pub struct SettlementConfig {
    pub max_retries: u32,
    pub base_backoff: std::time::Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub chains: Vec<ChainConfig>,
    pub symbols: HashMap<String, SymbolConfig>,
    pub settlement: SettlementConfig,
}

fn parse_address(context: &str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value).map_err(|_| ConfigError::InvalidAddress {
        context: context.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(context: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value).map_err(|_| ConfigError::InvalidDecimal {
        context: context.to_string(),
        value: value.to_string(),
    })
}

impl Config {
    /// Loads `config/exchange.toml` (if present) layered under
    /// `XCHAIN_`-prefixed environment variables, then validates addresses,
    /// decimals and cross-references explicitly (settlement address
    /// colliding with a token address, a symbol missing a chain's token
    /// pair).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let raw: RawConfig = config::Config::builder()
            .add_source(config::File::with_name("config/exchange").required(false))
            .add_source(
                config::Environment::with_prefix("XCHAIN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        let mut chains = Vec::with_capacity(raw.chains.len());
        for chain in &raw.chains {
            chains.push(ChainConfig {
                chain_id: NetworkId(chain.chain_id),
                rpc_url: chain.rpc_url.clone(),
                settlement_address: parse_address(
                    &format!("chains[{}].settlement_address", chain.chain_id),
                    &chain.settlement_address,
                )?,
                operator_key: chain.operator_key.clone(),
            });
        }

        let mut symbols = HashMap::with_capacity(raw.symbols.len());
        for sym in &raw.symbols {
            let symbol = orderbook::decimal::symbol_of(&sym.base_asset, &sym.quote_asset);
            if symbols.contains_key(&symbol) {
                return Err(ConfigError::DuplicateSymbol(symbol));
            }
            let tick = TickConfig::new(
                parse_decimal(&format!("symbols[{symbol}].tick_size"), &sym.tick_size)?,
                parse_decimal(&format!("symbols[{symbol}].min_quantity"), &sym.min_quantity)?,
            );
            let mut tokens = HashMap::with_capacity(sym.tokens.len());
            for (chain_id_str, pair) in &sym.tokens {
                let chain_id: u64 = chain_id_str.parse().map_err(|_| ConfigError::InvalidDecimal {
                    context: format!("symbols[{symbol}].tokens key"),
                    value: chain_id_str.clone(),
                })?;
                let base_token = parse_address(
                    &format!("symbols[{symbol}].tokens[{chain_id}].base_token"),
                    &pair.base_token,
                )?;
                let quote_token = parse_address(
                    &format!("symbols[{symbol}].tokens[{chain_id}].quote_token"),
                    &pair.quote_token,
                )?;
                tokens.insert(NetworkId(chain_id), (base_token, quote_token));
            }
            symbols.insert(
                symbol.clone(),
                SymbolConfig {
                    symbol,
                    base_asset: sym.base_asset.clone(),
                    quote_asset: sym.quote_asset.clone(),
                    tick,
                    tokens,
                },
            );
        }

        let config = Config {
            bind_address: raw.bind_address,
            chains,
            symbols,
            settlement: SettlementConfig {
                max_retries: raw.settlement.max_retries,
                base_backoff: std::time::Duration::from_millis(raw.settlement.base_backoff_ms),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates conditions that span multiple sections: a settlement
    /// address equal to a token address, or a symbol missing a configured
    /// chain's token pair for a chain this service knows about.
    fn validate(&self) -> Result<(), ConfigError> {
        for chain in &self.chains {
            for symbol in self.symbols.values() {
                if let Some((base, quote)) = symbol.tokens.get(&chain.chain_id) {
                    if *base == chain.settlement_address || *quote == chain.settlement_address {
                        return Err(ConfigError::SettlementAddressEqualsToken {
                            chain_id: chain.chain_id.0,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
