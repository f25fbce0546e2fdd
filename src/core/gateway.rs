// src/core/gateway.rs
use crate::config::AppConfig;
use crate::connectors::traits::{ExchangeClient, ExchangeError};
use crate::types::{ExchangeOutcome, OrderFailureKind, TradeDirective};
use std::sync::Arc;
use tracing::{info, warn};

/// Maps the boundary error onto the retry-policy bucket.
pub fn classify(err: &ExchangeError) -> OrderFailureKind {
    match err {
        ExchangeError::Network(_) => OrderFailureKind::Network,
        ExchangeError::Rejected(_) => OrderFailureKind::Exchange,
        ExchangeError::Unknown(_) => OrderFailureKind::Unknown,
    }
}

/// Submits planned directives and keeps the account preconditions affirmed.
pub struct ExecutionGateway {
    client: Arc<dyn ExchangeClient>,
}

impl ExecutionGateway {
    pub fn new(client: Arc<dyn ExchangeClient>) -> Self {
        Self { client }
    }

    /// Re-affirms leverage, hedge mode and margin mode. External state can
    /// reset between cycles, so this runs at the start of every cycle.
    /// Each call is independent and best-effort; a failure never blocks
    /// the remaining calls or the trading logic.
    pub async fn ensure_preconditions(
        &self,
        config: &AppConfig,
    ) -> Vec<(&'static str, ExchangeError)> {
        let mut failures = Vec::new();

        if let Err(e) = self.client.set_leverage(&config.symbol, config.leverage).await {
            warn!("leverage precondition failed: {}", e);
            failures.push(("set_leverage", e));
        }
        if let Err(e) = self.client.set_position_mode(true).await {
            warn!("hedge-mode precondition failed: {}", e);
            failures.push(("set_position_mode", e));
        }
        if let Err(e) = self
            .client
            .set_margin_mode(&config.symbol, config.margin_mode.as_str())
            .await
        {
            warn!("margin-mode precondition failed: {}", e);
            failures.push(("set_margin_mode", e));
        }

        failures
    }

    /// Submits the directive as a market order, or nothing for `NoAction`.
    /// No in-cycle retry on failure; the next poll re-evaluates from
    /// scratch.
    pub async fn execute(
        &self,
        directive: &TradeDirective,
        config: &AppConfig,
    ) -> Option<ExchangeOutcome> {
        let (side, quantity, position_side) = match directive {
            TradeDirective::NoAction => return None,
            TradeDirective::Open { side, quantity } => {
                (side.entry_order_side(), *quantity, *side)
            }
            TradeDirective::Close { side, quantity } => {
                (side.exit_order_side(), *quantity, *side)
            }
        };

        let outcome = match self
            .client
            .submit_market_order(&config.symbol, side, quantity, position_side)
            .await
        {
            Ok(order_id) => {
                info!("✅ Order confirmed: id {}", order_id);
                ExchangeOutcome::Success { order_id }
            }
            Err(e) => ExchangeOutcome::Failure {
                kind: classify(&e),
                message: e.to_string(),
            },
        };
        Some(outcome)
    }
}
