// src/config.rs
use config::{Config, ConfigError, File};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Which bias three consecutive down candles map to. Source deployments
/// disagreed on this, so it is an explicit, config-visible policy.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalPolarity {
    /// Three downs -> Short, three ups -> Long.
    TrendFollowing,
    /// Three downs -> Long, three ups -> Short.
    Contrarian,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarginMode {
    Isolated,
    Cross,
}

impl MarginMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarginMode::Isolated => "ISOLATED",
            MarginMode::Cross => "CROSSED",
        }
    }
}

/// One candle window to fetch per cycle, e.g. interval "1m", count 60.
#[derive(Debug, Deserialize, Clone)]
pub struct TimeframeSpec {
    pub interval: String,
    pub count: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub secret_key: String,
    pub symbol: String,
    pub leverage: u32,
    /// Fraction of equity committed per opened position; must stay below 1
    /// to leave margin headroom.
    pub risk_fraction: Decimal,
    /// Signed unrealized-profit threshold that triggers take-profit.
    pub profit_target: Decimal,
    /// Signed unrealized-profit threshold that triggers stop-loss.
    pub stop_loss_target: Decimal,
    /// Noise floor on initial margin; dust below it is not a position.
    pub small_position_threshold: Decimal,
    /// The first entry is the signal timeframe (1-minute in practice).
    pub timeframes: Vec<TimeframeSpec>,
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub trading_enabled: bool,
    pub signal_polarity: SignalPolarity,
    pub margin_mode: MarginMode,
    pub testnet: bool,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("Settings"))
            .add_source(config::Environment::with_prefix("APP"));

        let config = builder.build()?;
        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.risk_fraction >= Decimal::ONE || self.risk_fraction <= Decimal::ZERO {
            return Err(ConfigError::Message(format!(
                "risk_fraction must be in (0, 1), got {}",
                self.risk_fraction
            )));
        }
        if self.leverage == 0 {
            return Err(ConfigError::Message("leverage must be at least 1".into()));
        }
        if self.timeframes.is_empty() {
            return Err(ConfigError::Message(
                "at least one timeframe must be configured".into(),
            ));
        }
        if self.timeframes.iter().any(|tf| tf.count == 0) {
            return Err(ConfigError::Message(
                "timeframe candle counts must be positive".into(),
            ));
        }
        if self.stop_loss_target >= self.profit_target {
            return Err(ConfigError::Message(format!(
                "stop_loss_target {} must be below profit_target {}",
                self.stop_loss_target, self.profit_target
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Message("poll_interval_secs must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base() -> AppConfig {
        AppConfig {
            api_key: "k".into(),
            secret_key: "s".into(),
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

    #[test]
    fn rejects_full_risk_fraction() {
        let mut cfg = base();
        cfg.risk_fraction = Decimal::ONE;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut cfg = base();
        cfg.stop_loss_target = dec!(2);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_sane_config() {
        assert!(base().validate().is_ok());
    }
}
