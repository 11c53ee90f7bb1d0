//! Real-time trade stream: an ambient streaming surface alongside the
//! documented HTTP table, feeding a UI this service itself does not render.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::AppState;

pub async fn trade_stream(
    Path(symbol): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_trade_stream(socket, symbol, state))
}

async fn handle_trade_stream(socket: WebSocket, symbol: String, state: AppState) {
    info!(%symbol, "trade stream connection opened");

    let (mut sender, mut receiver) = socket.split();
    let mut trade_rx = state.trade_broadcaster.subscribe();
    let mut ping_interval = interval(Duration::from_secs(30));

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        info!(%symbol, "trade stream connection closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Err(err)) => {
                        warn!(%symbol, %err, "trade stream read error");
                        break;
                    }
                    _ => {}
                }
            }
            trade = trade_rx.recv() => {
                match trade {
                    Ok(event) if event.symbol == symbol => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if sender.send(Message::Text(json)).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => warn!(%symbol, %err, "failed to serialize trade event"),
                        }
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(%symbol, skipped, "trade stream subscriber lagged, dropping events");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ping_interval.tick() => {
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }
}
