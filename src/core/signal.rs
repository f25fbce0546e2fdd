// src/core/signal.rs
use crate::config::SignalPolarity;
use crate::types::{Candle, PositionSide};

/// Directional bias derived from recent 1-minute candle shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Long,
    Short,
    None,
}

impl Bias {
    pub fn side(&self) -> Option<PositionSide> {
        match self {
            Bias::Long => Some(PositionSide::Long),
            Bias::Short => Some(PositionSide::Short),
            Bias::None => None,
        }
    }
}

impl SignalPolarity {
    /// Bias for a down-shaped streak or volume spike under this polarity.
    fn map_down(&self, down: bool) -> Bias {
        match (self, down) {
            (SignalPolarity::TrendFollowing, true) => Bias::Short,
            (SignalPolarity::TrendFollowing, false) => Bias::Long,
            (SignalPolarity::Contrarian, true) => Bias::Long,
            (SignalPolarity::Contrarian, false) => Bias::Short,
        }
    }
}

/// Pure decision over the three most recent 1-minute candles, newest last.
///
/// Rules, in order: a three-candle streak in one direction wins; failing
/// that, a newest candle whose volume exceeds the other two combined sets
/// the bias from its own direction. Identical inputs always yield the
/// identical bias.
pub fn evaluate(last3: &[Candle; 3], polarity: SignalPolarity) -> Bias {
    let downs = [last3[0].is_down(), last3[1].is_down(), last3[2].is_down()];

    if downs.iter().all(|&d| d) {
        return polarity.map_down(true);
    }
    if downs.iter().all(|&d| !d) {
        return polarity.map_down(false);
    }

    let newest = &last3[2];
    if newest.volume > last3[0].volume + last3[1].volume {
        return polarity.map_down(newest.is_down());
    }

    Bias::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn candle(open: i64, close: i64, volume: i64) -> Candle {
        Candle {
            timestamp: 0,
            open: Decimal::from(open),
            high: Decimal::from(open.max(close)),
            low: Decimal::from(open.min(close)),
            close: Decimal::from(close),
            volume: Decimal::from(volume),
        }
    }

    #[test]
    fn three_downs_are_deterministic() {
        // The §8 shape: [{10,9},{11,10},{12,11}], all down.
        let triple = [candle(10, 9, 5), candle(11, 10, 5), candle(12, 11, 5)];
        let first = evaluate(&triple, SignalPolarity::TrendFollowing);
        assert_eq!(first, Bias::Short);
        for _ in 0..10 {
            assert_eq!(evaluate(&triple, SignalPolarity::TrendFollowing), first);
        }
    }

    #[test]
    fn three_ups_invert_the_streak_bias() {
        let triple = [candle(9, 10, 5), candle(10, 11, 5), candle(11, 12, 5)];
        assert_eq!(evaluate(&triple, SignalPolarity::TrendFollowing), Bias::Long);
        assert_eq!(evaluate(&triple, SignalPolarity::Contrarian), Bias::Short);
    }

    #[test]
    fn contrarian_flips_the_down_streak() {
        let triple = [candle(10, 9, 5), candle(11, 10, 5), candle(12, 11, 5)];
        assert_eq!(evaluate(&triple, SignalPolarity::Contrarian), Bias::Long);
    }

    #[test]
    fn doji_counts_as_up() {
        // open == close breaks a down streak.
        let triple = [candle(10, 9, 5), candle(10, 10, 5), candle(12, 11, 5)];
        assert_eq!(evaluate(&triple, SignalPolarity::TrendFollowing), Bias::None);
    }

    #[test]
    fn volume_spike_follows_newest_direction() {
        // Mixed shapes, newest volume 11 > 5 + 5, newest is down.
        let triple = [candle(9, 10, 5), candle(11, 10, 5), candle(12, 11, 11)];
        assert_eq!(evaluate(&triple, SignalPolarity::TrendFollowing), Bias::Short);

        // Same but newest is up.
        let triple = [candle(10, 9, 5), candle(10, 11, 5), candle(11, 12, 11)];
        assert_eq!(evaluate(&triple, SignalPolarity::TrendFollowing), Bias::Long);
    }

    #[test]
    fn equal_volume_is_not_a_spike() {
        let triple = [candle(9, 10, 5), candle(11, 10, 5), candle(12, 11, 10)];
        assert_eq!(evaluate(&triple, SignalPolarity::TrendFollowing), Bias::None);
    }
}
