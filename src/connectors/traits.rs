// src/connectors/traits.rs
use crate::types::{AccountSnapshot, Candle, PositionSide, Side};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Classified failure from the exchange boundary. The core only ever sees
/// these tags, never any client's own error hierarchy.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Transient transport failure (timeout, connection reset). Safe to
    /// retry on the next poll.
    #[error("network error: {0}")]
    Network(String),

    /// The exchange actively rejected the request.
    #[error("exchange rejected request: {0}")]
    Rejected(String),

    #[error("unclassified exchange failure: {0}")]
    Unknown(String),
}

/// The abstract exchange contract the engine runs against. A mock
/// implementation drives the integration tests.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Connectivity check, used once at startup.
    async fn ping(&self) -> Result<(), ExchangeError>;

    /// The `count` most recent candles for `interval` (e.g. "1m"),
    /// ordering not guaranteed.
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        count: u32,
    ) -> Result<Vec<Candle>, ExchangeError>;

    /// Total quote equity plus every open position, in one snapshot.
    async fn fetch_balance_and_positions(&self) -> Result<AccountSnapshot, ExchangeError>;

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), ExchangeError>;

    /// `margin_mode` is the exchange's own token, e.g. "ISOLATED".
    async fn set_margin_mode(&self, symbol: &str, margin_mode: &str) -> Result<(), ExchangeError>;

    /// Enables or disables hedge (dual-side) position mode account-wide.
    async fn set_position_mode(&self, hedged: bool) -> Result<(), ExchangeError>;

    /// Market order tagged with the hedge-mode leg it acts on.
    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        position_side: PositionSide,
    ) -> Result<String, ExchangeError>;
}
