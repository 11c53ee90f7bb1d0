//! Cross-chain spot exchange service: book registry plus HTTP API surface.
//!
//! Exposes the HTTP surface over Axum: form-encoded
//! `payload` bodies carrying JSON for the `register_order*`/`cancel_order`/
//! `orderbook*`/`order`/`get_best_order`/`check_available_funds` endpoints,
//! plain query strings for the read-only GET endpoints. All state lives in
//! [`exchange::Exchange`], built once from [`config::Config`] at startup and
//! handed to every handler through `State`.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use orderbook::NetworkId;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

mod config;
mod error;
mod exchange;
mod types;
mod websocket;

use config::Config;
use error::AppError;
use exchange::Exchange;
use types::*;

#[derive(Clone)]
pub struct AppState {
    exchange: Arc<Exchange>,
    trade_broadcaster: tokio::sync::broadcast::Sender<TradeEvent>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::load().context("failed to load configuration") {
        Ok(config) => config,
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    };
    let bind_address = config.bind_address.clone();

    let exchange = Arc::new(Exchange::new(config));
    let (trade_tx, _) = tokio::sync::broadcast::channel(1024);
    let state = AppState {
        exchange,
        trade_broadcaster: trade_tx,
    };

    let app = Router::new()
        .route("/api/register_order", post(register_order))
        .route("/api/register_order_cross", post(register_order_cross))
        .route("/api/cancel_order", post(cancel_order))
        .route("/api/orderbook", post(orderbook))
        .route("/api/orderbook_cross", post(orderbook_cross))
        .route("/api/order", post(order_lookup))
        .route("/api/get_best_order", post(get_best_order))
        .route("/api/check_available_funds", post(check_available_funds))
        .route("/api/price", get(price_proxy))
        .route("/api/kline", get(kline_proxy))
        .route("/api/settlement_health", get(settlement_health))
        .route("/api/get_settlement_address", get(get_settlement_address))
        .route("/api/order_history", get(order_history))
        .route("/api/order_history_cross", get(order_history_cross))
        .route("/ws/trades/:symbol", get(websocket::trade_stream))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, %bind_address, "failed to bind HTTP listener");
            std::process::exit(1);
        }
    };

    info!(%bind_address, "exchange service listening");
    if let Err(err) = axum::serve(listener, app).await {
        error!(%err, "server exited with an error");
        std::process::exit(2);
    }
}

fn settlement_summaries(infos: Vec<settlement::SettlementInfo>) -> Vec<SettlementSummary> {
    infos
        .into_iter()
        .map(|info| SettlementSummary {
            trade_id: info.trade_id.0,
            path: match info.path {
                settlement::SettlementPath::SameChain => "same_chain",
                settlement::SettlementPath::CrossChain => "cross_chain",
            },
            state: format!("{:?}", info.state),
        })
        .collect()
}

async fn broadcast_trades(state: &AppState, symbol: &str, trades: &[orderbook::Trade]) {
    for trade in trades {
        let _ = state.trade_broadcaster.send(TradeEvent {
            symbol: symbol.to_string(),
            trade: trade.clone(),
        });
    }
}

/// `POST /api/register_order`: admits a same-chain order.
async fn register_order(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Result<impl IntoResponse, AppError> {
    let request: RegisterOrderRequest = form.parse()?;
    let symbol = orderbook::decimal::symbol_of(&request.base_asset, &request.quote_asset);
    let new_order = request.into_new_order(false)?;
    let (admission, settlements) = state.exchange.register_order(new_order, false).await?;
    broadcast_trades(&state, &symbol, &admission.trades).await;

    Ok((
        StatusCode::OK,
        Json(RegisterOrderResponse {
            status_code: StatusCode::OK.as_u16(),
            order: RegisteredOrder {
                order_id: admission.order_id.0,
                trades: admission.trades,
            },
            settlement_info: settlement_summaries(settlements),
        }),
    ))
}

/// `POST /api/register_order_cross`: admits a cross-chain order.
async fn register_order_cross(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Result<impl IntoResponse, AppError> {
    let request: RegisterOrderRequest = form.parse()?;
    let symbol = orderbook::decimal::symbol_of(&request.base_asset, &request.quote_asset);
    let new_order = request.into_new_order(true)?;
    let (admission, settlements) = state.exchange.register_order(new_order, true).await?;
    broadcast_trades(&state, &symbol, &admission.trades).await;

    Ok((
        StatusCode::OK,
        Json(RegisterOrderResponse {
            status_code: StatusCode::OK.as_u16(),
            order: RegisteredOrder {
                order_id: admission.order_id.0,
                trades: admission.trades,
            },
            settlement_info: settlement_summaries(settlements),
        }),
    ))
}

/// `POST /api/cancel_order`.
async fn cancel_order(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Result<impl IntoResponse, AppError> {
    let request: CancelOrderRequest = form.parse()?;
    let symbol = orderbook::decimal::symbol_of(&request.base_asset, &request.quote_asset);
    state
        .exchange
        .cancel_order(&symbol, request.cross_chain, orderbook::OrderId(request.order_id))
        .await?;
    Ok(Json(CancelOrderResponse {
        status_code: StatusCode::OK.as_u16(),
    }))
}

/// `POST /api/orderbook`: same-chain venue snapshot.
async fn orderbook(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Result<impl IntoResponse, AppError> {
    let request: OrderbookRequest = form.parse()?;
    let snapshot = state.exchange.snapshot(&request.symbol, false).await?;
    Ok(Json(OrderbookResponse {
        bids: snapshot.bids,
        asks: snapshot.asks,
    }))
}

/// `POST /api/orderbook_cross`: cross-chain venue snapshot.
async fn orderbook_cross(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Result<impl IntoResponse, AppError> {
    let request: OrderbookRequest = form.parse()?;
    let snapshot = state.exchange.snapshot(&request.symbol, true).await?;
    Ok(Json(OrderbookResponse {
        bids: snapshot.bids,
        asks: snapshot.asks,
    }))
}

/// `POST /api/order`: lookup by id.
async fn order_lookup(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Result<impl IntoResponse, AppError> {
    let request: OrderLookupRequest = form.parse()?;
    let symbol = orderbook::decimal::symbol_of(&request.base_asset, &request.quote_asset);
    let order = state
        .exchange
        .order(&symbol, request.cross_chain, orderbook::OrderId(request.order_id))
        .await?;
    Ok(Json(OrderResponse(order)))
}

/// `POST /api/get_best_order`: top of book for a side.
async fn get_best_order(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Result<impl IntoResponse, AppError> {
    let request: BestOrderRequest = form.parse()?;
    let symbol = orderbook::decimal::symbol_of(&request.base_asset, &request.quote_asset);
    let (price, quantity) = state
        .exchange
        .best_order(&symbol, request.cross_chain, request.side)
        .await?;
    Ok(Json(BestOrderResponse { price, quantity }))
}

/// `POST /api/check_available_funds`: escrow read for `(account, asset)` on
/// the caller-supplied network.
async fn check_available_funds(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Result<impl IntoResponse, AppError> {
    let request: CheckFundsRequest = form.parse()?;
    let account = request
        .account
        .parse::<alloy_primitives::Address>()
        .map_err(|_| AppError::Validation(format!("invalid account address {:?}", request.account)))?;
    let asset = request
        .asset
        .parse::<alloy_primitives::Address>()
        .map_err(|_| AppError::Validation(format!("invalid asset address {:?}", request.asset)))?;
    let snapshot = state
        .exchange
        .check_funds(NetworkId(request.network), account, asset)
        .await?;
    Ok(Json(CheckFundsResponse {
        available: snapshot.available,
        locked: snapshot.locked,
        total: snapshot.total,
    }))
}

/// `GET /api/price?currency_pair=X_Y`: external reference-price proxy.
/// The price-feed service it fronts is an external collaborator; this
/// handler exists so the documented surface responds, but does not proxy
/// anything.
async fn price_proxy() -> Response {
    AppError::NotImplemented("external price feed proxy is not part of this service".into())
        .into_response()
}

/// `GET /api/kline?...`: external candle-data proxy, same rationale as
/// [`price_proxy`].
async fn kline_proxy() -> Response {
    AppError::NotImplemented("external kline feed proxy is not part of this service".into())
        .into_response()
}

/// `GET /api/settlement_health`: liveness probe.
async fn settlement_health() -> impl IntoResponse {
    Json(HealthResponse { ok: true })
}

/// `GET /api/get_settlement_address?network=...`.
async fn get_settlement_address(
    State(state): State<AppState>,
    Query(query): Query<SettlementAddressQuery>,
) -> Result<impl IntoResponse, AppError> {
    let address = state.exchange.settlement_address(NetworkId(query.network))?;
    Ok(Json(SettlementAddressResponse {
        settlement_address: address,
    }))
}

/// `GET /api/order_history?symbol=&limit=`: same-chain tape.
async fn order_history(
    State(state): State<AppState>,
    Query(query): Query<OrderHistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let trades = state
        .exchange
        .tape(&query.symbol, false, query.limit.unwrap_or(100))
        .await?;
    Ok(Json(trades))
}

/// `GET /api/order_history_cross?symbol=&limit=`: cross-chain tape.
async fn order_history_cross(
    State(state): State<AppState>,
    Query(query): Query<OrderHistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let trades = state
        .exchange
        .tape(&query.symbol, true, query.limit.unwrap_or(100))
        .await?;
    Ok(Json(trades))
}
