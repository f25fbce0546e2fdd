// src/errors.rs
use crate::connectors::traits::ExchangeError;
use crate::types::OrderFailureKind;
use thiserror::Error;

/// Per-cycle error taxonomy. Everything here is caught at the engine
/// boundary and turned into a report line; nothing terminates the loop.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("cannot summarize an empty candle window")]
    EmptyCandles,

    #[error("data fetch failed: {0}")]
    DataFetch(#[source] ExchangeError),

    #[error("account precondition failed: {0}")]
    Precondition(#[source] ExchangeError),

    #[error("order failed ({kind}): {message}")]
    Order {
        kind: OrderFailureKind,
        message: String,
    },
}
