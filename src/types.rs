// src/types.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side as the exchange understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// Hedge-mode leg of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "LONG",
            PositionSide::Short => "SHORT",
        }
    }

    /// The order side that opens this leg.
    pub fn entry_order_side(&self) -> Side {
        match self {
            PositionSide::Long => Side::Buy,
            PositionSide::Short => Side::Sell,
        }
    }

    /// The order side that closes this leg.
    pub fn exit_order_side(&self) -> Side {
        match self {
            PositionSide::Long => Side::Sell,
            PositionSide::Short => Side::Buy,
        }
    }
}

/// One OHLCV bar. Immutable once fetched; `timestamp` is epoch millis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// `open > close` is the only down shape; a doji counts as up.
    pub fn is_down(&self) -> bool {
        self.open > self.close
    }
}

/// Per-timeframe statistics over one fetched candle window.
/// Recomputed fresh every cycle, never mutated.
#[derive(Debug, Clone)]
pub struct TimeframeSummary {
    pub high: Decimal,
    pub low: Decimal,
    pub average: Decimal,
    pub last_price: Decimal,
    pub candles: Vec<Candle>,
}

/// Exchange-reported position snapshot for one symbol/side.
/// Owned by the exchange; read once per cycle, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub initial_margin: Decimal,
    pub leverage: Decimal,
    pub unrealized_profit: Decimal,
    /// Absolute contract amount, sign stripped.
    pub amount_abs: Decimal,
}

/// Combined result of the balance + positions fetch.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    /// Total equity in the quote currency (wallet balance + unrealized PnL).
    pub total_equity: Decimal,
    pub positions: Vec<Position>,
}

/// The single decision the engine produces per cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeDirective {
    NoAction,
    Open { side: PositionSide, quantity: Decimal },
    Close { side: PositionSide, quantity: Decimal },
}

/// Failure bucket for exchange calls. `Network` is transient and safe to
/// retry next cycle; `Exchange` means the request was actively rejected;
/// `Unknown` is treated like `Exchange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFailureKind {
    Network,
    Exchange,
    Unknown,
}

impl std::fmt::Display for OrderFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderFailureKind::Network => "network",
            OrderFailureKind::Exchange => "exchange",
            OrderFailureKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Result of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Success { order_id: String },
    Failure { kind: OrderFailureKind, message: String },
}
