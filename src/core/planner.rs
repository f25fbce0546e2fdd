// src/core/planner.rs
use crate::config::AppConfig;
use crate::core::evaluator::PositionAssessment;
use crate::core::signal::Bias;
use crate::types::TradeDirective;
use rust_decimal::Decimal;

/// Turns this cycle's assessment and bias into the single trade directive.
///
/// A held position is only ever closed or kept; an open is considered only
/// when no position exists, so Open and Close can never both be issued in
/// one cycle. Quantity is truncated toward zero so rounding never
/// over-commits margin.
pub fn plan(
    assessment: &PositionAssessment,
    bias: Bias,
    total_equity: Decimal,
    config: &AppConfig,
) -> TradeDirective {
    if assessment.has_position {
        if !assessment.should_exit {
            return TradeDirective::NoAction;
        }
        // Close the leg we hold; quantity is its absolute contract amount.
        match (&assessment.side, &assessment.position) {
            (Some(side), Some(position)) => TradeDirective::Close {
                side: *side,
                quantity: position.amount_abs,
            },
            _ => TradeDirective::NoAction,
        }
    } else {
        if !config.trading_enabled {
            return TradeDirective::NoAction;
        }
        match bias.side() {
            Some(side) => {
                let quantity =
                    (config.risk_fraction * total_equity * Decimal::from(config.leverage)).floor();
                if quantity <= Decimal::ZERO {
                    return TradeDirective::NoAction;
                }
                TradeDirective::Open { side, quantity }
            }
            None => TradeDirective::NoAction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MarginMode, SignalPolarity, TimeframeSpec};
    use crate::types::{Position, PositionSide};
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

    fn held(side: PositionSide, should_exit: bool) -> PositionAssessment {
        PositionAssessment {
            has_position: true,
            should_exit,
            side: Some(side),
            position: Some(Position {
                symbol: "ETHUSDT".into(),
                side,
                entry_price: dec!(2000),
                initial_margin: dec!(100),
                leverage: dec!(10),
                unrealized_profit: dec!(2),
                amount_abs: dec!(7),
            }),
        }
    }

    #[test]
    fn open_quantity_is_floored_equity_times_leverage() {
        // equity 1000, leverage 10, risk 0.95 -> 9500 contracts.
        let directive = plan(
            &PositionAssessment::default(),
            Bias::Long,
            dec!(1000),
            &config(),
        );
        assert_eq!(
            directive,
            TradeDirective::Open {
                side: PositionSide::Long,
                quantity: dec!(9500),
            }
        );
    }

    #[test]
    fn open_truncates_toward_zero() {
        let directive = plan(
            &PositionAssessment::default(),
            Bias::Short,
            dec!(10.07),
            &config(),
        );
        assert_eq!(
            directive,
            TradeDirective::Open {
                side: PositionSide::Short,
                quantity: dec!(95),
            }
        );
    }

    #[test]
    fn exit_closes_the_held_amount() {
        let directive = plan(&held(PositionSide::Long, true), Bias::None, dec!(1000), &config());
        assert_eq!(
            directive,
            TradeDirective::Close {
                side: PositionSide::Long,
                quantity: dec!(7),
            }
        );
    }

    #[test]
    fn held_position_never_opens() {
        // Even with a live bias, a held position may only close or hold.
        let directive = plan(&held(PositionSide::Long, false), Bias::Short, dec!(1000), &config());
        assert_eq!(directive, TradeDirective::NoAction);
    }

    #[test]
    fn no_bias_means_no_action() {
        let directive = plan(&PositionAssessment::default(), Bias::None, dec!(1000), &config());
        assert_eq!(directive, TradeDirective::NoAction);
    }

    #[test]
    fn trading_disabled_blocks_opens_only() {
        let mut cfg = config();
        cfg.trading_enabled = false;
        let open = plan(&PositionAssessment::default(), Bias::Long, dec!(1000), &cfg);
        assert_eq!(open, TradeDirective::NoAction);

        // Exits still go through so a live position is never stranded.
        let close = plan(&held(PositionSide::Long, true), Bias::None, dec!(1000), &cfg);
        assert!(matches!(close, TradeDirective::Close { .. }));
    }

    #[test]
    fn planning_is_idempotent() {
        let assessment = PositionAssessment::default();
        let a = plan(&assessment, Bias::Long, dec!(1234.56), &config());
        let b = plan(&assessment, Bias::Long, dec!(1234.56), &config());
        assert_eq!(a, b);
    }

    #[test]
    fn zero_equity_opens_nothing() {
        let directive = plan(&PositionAssessment::default(), Bias::Long, dec!(0), &config());
        assert_eq!(directive, TradeDirective::NoAction);
    }
}
