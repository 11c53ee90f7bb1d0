//! Wire types for the HTTP API. Requests arrive as form-encoded bodies
//! carrying a `payload` field of JSON text; numeric fields inside that JSON
//! arrive as strings and are parsed through `rust_decimal::Decimal` at the
//! boundary, never as native floats.

use std::str::FromStr;

use alloy_primitives::Address;
use orderbook::{NetworkId, NewOrder, Order, OrderType, Side, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Every `POST` endpoint carries its JSON body inside this
/// single form field rather than as the request's content type.
#[derive(Debug, Deserialize)]
pub struct PayloadForm {
    pub payload: String,
}

impl PayloadForm {
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_str(&self.payload)
            .map_err(|e| AppError::BadRequest(format!("invalid payload JSON: {e}")))
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, AppError> {
    Address::from_str(value)
        .map_err(|_| AppError::Validation(format!("{field} is not a valid address: {value:?}")))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(value)
        .map_err(|_| AppError::Validation(format!("{field} is not a valid decimal: {value:?}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOrderRequest {
    pub account: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub side: Side,
    #[serde(default, rename = "type")]
    pub kind: Option<OrderType>,
    pub price: Option<String>,
    pub quantity: String,
    pub from_network: u64,
    pub to_network: u64,
    pub receive_wallet: String,
}

impl RegisterOrderRequest {
    /// Converts to the book's [`NewOrder`], validating the endpoint's
    /// same-chain/cross-chain precondition: same-chain orders require
    /// `from_network == to_network`, cross-chain orders require
    /// `from_network != to_network`.
    pub fn into_new_order(self, expect_cross_chain: bool) -> Result<NewOrder, AppError> {
        let from_network = NetworkId(self.from_network);
        let to_network = NetworkId(self.to_network);
        let is_cross = from_network != to_network;
        if is_cross != expect_cross_chain {
            return Err(AppError::Validation(format!(
                "{} network mismatch: fromNetwork={from_network:?}, toNetwork={to_network:?}",
                if expect_cross_chain { "register_order_cross" } else { "register_order" }
            )));
        }
        let kind = self.kind.unwrap_or(OrderType::Limit);
        let price = match (&kind, &self.price) {
            (OrderType::Limit, Some(p)) => Some(parse_decimal("price", p)?),
            (OrderType::Limit, None) => {
                return Err(AppError::Validation("limit orders require a price".into()))
            }
            (OrderType::Market, _) => None,
        };
        Ok(NewOrder {
            account: parse_address("account", &self.account)?,
            base_asset: self.base_asset,
            quote_asset: self.quote_asset,
            side: self.side,
            kind,
            price,
            quantity: parse_decimal("quantity", &self.quantity)?,
            from_network,
            to_network,
            receive_wallet: parse_address("receiveWallet", &self.receive_wallet)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RegisteredOrder {
    pub order_id: u64,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Serialize)]
pub struct RegisterOrderResponse {
    pub status_code: u16,
    pub order: RegisteredOrder,
    pub settlement_info: Vec<SettlementSummary>,
}

#[derive(Debug, Serialize)]
pub struct SettlementSummary {
    pub trade_id: u64,
    pub path: &'static str,
    pub state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    pub order_id: u64,
    pub side: Side,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub cross_chain: bool,
}

#[derive(Debug, Serialize)]
pub struct CancelOrderResponse {
    pub status_code: u16,
}

#[derive(Debug, Deserialize)]
pub struct OrderbookRequest {
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct OrderbookResponse {
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLookupRequest {
    pub order_id: u64,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub cross_chain: bool,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct OrderResponse(pub Order);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOrderRequest {
    pub base_asset: String,
    pub quote_asset: String,
    pub side: Side,
    #[serde(default)]
    pub cross_chain: bool,
}

#[derive(Debug, Serialize)]
pub struct BestOrderResponse {
    pub price: Option<Decimal>,
    pub quantity: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct CheckFundsRequest {
    pub account: String,
    pub asset: String,
    pub network: u64,
}

#[derive(Debug, Serialize)]
pub struct CheckFundsResponse {
    pub available: Decimal,
    pub locked: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct OrderHistoryQuery {
    pub symbol: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SettlementAddressQuery {
    pub network: u64,
}

#[derive(Debug, Serialize)]
pub struct SettlementAddressResponse {
    pub settlement_address: Address,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Real-time trade execution event, pushed to WebSocket subscribers. An
/// ambient streaming surface alongside the documented HTTP table, feeding a
/// UI this service itself does not render.
#[derive(Debug, Clone, Serialize)]
pub struct TradeEvent {
    pub symbol: String,
    pub trade: Trade,
}
