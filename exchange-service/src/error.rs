//! HTTP-facing error surface, mapped to a fixed failure table. Library
//! errors (`orderbook::BookError`, `escrow::EscrowError`,
//! `settlement::SettlementError`) convert into this via `From`. `AppError`
//! implements `IntoResponse` directly rather than threading a generic error
//! type through every handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("malformed request: {0}")]
    BadRequest(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("insufficient escrow: available {available}, required {required}")]
    InsufficientEscrow { available: Decimal, required: Decimal },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<orderbook::BookError> for AppError {
    fn from(err: orderbook::BookError) -> Self {
        match err {
            orderbook::BookError::NotFound(id) => AppError::NotFound(format!("order {id:?}")),
            orderbook::BookError::TickMismatch => {
                AppError::Validation("price is not on the symbol's tick grid".into())
            }
            orderbook::BookError::InvalidQuantity => {
                AppError::Validation("quantity must be positive and meet the symbol minimum".into())
            }
            orderbook::BookError::MissingPrice => {
                AppError::Validation("limit orders require a price".into())
            }
        }
    }
}

impl From<settlement::SettlementError> for AppError {
    fn from(err: settlement::SettlementError) -> Self {
        match err {
            settlement::SettlementError::InsufficientEscrow { available, required } => {
                AppError::InsufficientEscrow { available, required }
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation"),
            AppError::InsufficientEscrow { .. } => {
                (StatusCode::PAYMENT_REQUIRED, "InsufficientEscrow")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            AppError::NotImplemented(_) => (StatusCode::NOT_IMPLEMENTED, "NotImplemented"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal"),
        };
        let body = Json(json!({
            "status_code": status.as_u16(),
            "error": code,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
