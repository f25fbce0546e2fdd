// src/core/evaluator.rs
use crate::config::AppConfig;
use crate::types::{Position, PositionSide};

/// What the exchange says about our exposure this cycle.
#[derive(Debug, Clone, Default)]
pub struct PositionAssessment {
    pub has_position: bool,
    pub should_exit: bool,
    pub side: Option<PositionSide>,
    /// The matched position, for quantity and reporting.
    pub position: Option<Position>,
}

/// Scans the reported positions once and assesses the first real one for
/// the configured symbol. "Real" means initial margin above the configured
/// noise floor; dust from partial fills is ignored. Only one leg is
/// expected to be active since the engine opened it itself.
pub fn evaluate(positions: &[Position], config: &AppConfig) -> PositionAssessment {
    for position in positions {
        if position.symbol != config.symbol {
            continue;
        }
        if position.initial_margin <= config.small_position_threshold {
            continue;
        }

        let take_profit = position.unrealized_profit >= config.profit_target;
        let stop_loss = position.unrealized_profit <= config.stop_loss_target;

        return PositionAssessment {
            has_position: true,
            should_exit: take_profit || stop_loss,
            side: Some(position.side),
            position: Some(position.clone()),
        };
    }

    PositionAssessment::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MarginMode, SignalPolarity, TimeframeSpec};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn config() -> AppConfig {
        AppConfig {
            api_key: String::new(),
            secret_key: String::new(),
            symbol: "ETHUSDT".into(),
            leverage: 10,
            risk_fraction: dec!(0.95),
            profit_target: dec!(1),
            stop_loss_target: dec!(-10),
            small_position_threshold: dec!(1),
            timeframes: vec![TimeframeSpec {
                interval: "1m".into(),
                count: 60,
            }],
            poll_interval_secs: 60,
            http_timeout_secs: 10,
            trading_enabled: true,
            signal_polarity: SignalPolarity::TrendFollowing,
            margin_mode: MarginMode::Isolated,
            testnet: true,
        }
    }

    fn position(symbol: &str, margin: Decimal, pnl: Decimal) -> Position {
        Position {
            symbol: symbol.into(),
            side: PositionSide::Long,
            entry_price: dec!(2000),
            initial_margin: margin,
            leverage: dec!(10),
            unrealized_profit: pnl,
            amount_abs: dec!(5),
        }
    }

    #[test]
    fn zero_margin_is_not_a_position() {
        let positions = vec![position("ETHUSDT", Decimal::ZERO, dec!(5))];
        let assessment = evaluate(&positions, &config());
        assert!(!assessment.has_position);
        assert!(!assessment.should_exit);
    }

    #[test]
    fn dust_below_the_noise_floor_is_ignored() {
        let positions = vec![position("ETHUSDT", dec!(0.5), dec!(5))];
        assert!(!evaluate(&positions, &config()).has_position);
    }

    #[test]
    fn other_symbols_are_skipped() {
        let positions = vec![position("BTCUSDT", dec!(100), dec!(5))];
        assert!(!evaluate(&positions, &config()).has_position);
    }

    #[test]
    fn take_profit_triggers_exit() {
        // unrealized 2 vs target 1.
        let positions = vec![position("ETHUSDT", dec!(100), dec!(2))];
        let assessment = evaluate(&positions, &config());
        assert!(assessment.has_position);
        assert!(assessment.should_exit);
        assert_eq!(assessment.side, Some(PositionSide::Long));
    }

    #[test]
    fn stop_loss_triggers_exit() {
        let positions = vec![position("ETHUSDT", dec!(100), dec!(-12))];
        let assessment = evaluate(&positions, &config());
        assert!(assessment.has_position);
        assert!(assessment.should_exit);
    }

    #[test]
    fn holding_inside_the_band_does_not_exit() {
        let positions = vec![position("ETHUSDT", dec!(100), dec!(0.2))];
        let assessment = evaluate(&positions, &config());
        assert!(assessment.has_position);
        assert!(!assessment.should_exit);
    }

    #[test]
    fn first_real_match_wins() {
        let mut short = position("ETHUSDT", dec!(100), dec!(0));
        short.side = PositionSide::Short;
        let positions = vec![
            position("ETHUSDT", Decimal::ZERO, dec!(0)),
            short,
            position("ETHUSDT", dec!(200), dec!(5)),
        ];
        let assessment = evaluate(&positions, &config());
        assert_eq!(assessment.side, Some(PositionSide::Short));
    }
}
