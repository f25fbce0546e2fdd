// src/core/aggregator.rs
use crate::errors::BotError;
use crate::types::{Candle, TimeframeSummary};
use rust_decimal::Decimal;

/// Collapses one fetched candle window into its per-timeframe statistics.
///
/// The exchange does not guarantee ordering, so candles are sorted by
/// timestamp ascending before "last" is taken from the final element.
pub fn summarize(mut candles: Vec<Candle>) -> Result<TimeframeSummary, BotError> {
    if candles.is_empty() {
        return Err(BotError::EmptyCandles);
    }
    candles.sort_by_key(|c| c.timestamp);

    let mut high = candles[0].high;
    let mut low = candles[0].low;
    for candle in &candles[1..] {
        high = high.max(candle.high);
        low = low.min(candle.low);
    }

    // Last element is now the newest candle.
    let last_price = candles[candles.len() - 1].close;

    Ok(TimeframeSummary {
        high,
        low,
        average: (high + low) / Decimal::TWO,
        last_price,
        candles,
    })
}

/// The `n` newest candles from a summary, oldest first.
pub fn newest<'a>(summary: &'a TimeframeSummary, n: usize) -> &'a [Candle] {
    let len = summary.candles.len();
    &summary.candles[len.saturating_sub(n)..]
}
