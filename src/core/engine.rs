// src/core/engine.rs
use crate::config::AppConfig;
use crate::connectors::traits::ExchangeClient;
use crate::core::aggregator::{newest, summarize};
use crate::core::evaluator::{self, PositionAssessment};
use crate::core::gateway::{self, ExecutionGateway};
use crate::core::planner;
use crate::core::signal::{self, Bias};
use crate::errors::BotError;
use crate::notify::{CycleReport, Notifier, ReporterHandle};
use crate::types::{AccountSnapshot, ExchangeOutcome, TimeframeSummary, TradeDirective};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Everything one cycle computed, threaded explicitly instead of living in
/// shared mutable state. Dropped when the cycle ends.
pub struct CycleContext {
    pub summaries: HashMap<String, TimeframeSummary>,
    pub account: AccountSnapshot,
    pub assessment: PositionAssessment,
    pub bias: Bias,
    pub directive: TradeDirective,
}

pub struct Engine {
    config: AppConfig,
    client: Arc<dyn ExchangeClient>,
    gateway: ExecutionGateway,
    reporter: ReporterHandle,
    notifier: Box<dyn Notifier>,
}

impl Engine {
    pub fn new(
        config: AppConfig,
        client: Arc<dyn ExchangeClient>,
        reporter: ReporterHandle,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let gateway = ExecutionGateway::new(Arc::clone(&client));
        Self {
            config,
            client,
            gateway,
            reporter,
            notifier,
        }
    }

    /// Loops forever with a fixed inter-cycle delay. A failed cycle is
    /// reported and the loop moves on; only process termination stops it.
    pub async fn run(&self) {
        info!(
            "Engine loop running for {} every {}s",
            self.config.symbol, self.config.poll_interval_secs
        );
        loop {
            let mut report = CycleReport::new(self.reporter.is_verbose());

            match self.run_cycle(&mut report).await {
                Ok(context) => {
                    info!(
                        "Cycle complete: {:?} (bias {:?})",
                        context.directive, context.bias
                    );
                }
                Err(e) => {
                    error!("Cycle aborted: {}", e);
                    report.push(format!("cycle error: {}", e));
                }
            }

            report.flush(&self.reporter, self.notifier.as_ref());
            tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }
    }

    /// One full pass: preconditions, data, evaluation, plan, execution.
    pub async fn run_cycle(&self, report: &mut CycleReport) -> Result<CycleContext, BotError> {
        // Preconditions are best-effort; their failures only become report
        // lines and never block the trading logic.
        for (call, err) in self.gateway.ensure_preconditions(&self.config).await {
            let kind = gateway::classify(&err);
            report.push(format!("{} [{}: {}]", BotError::Precondition(err), call, kind));
        }

        let summaries = self.fetch_summaries(report).await?;

        let account = self
            .client
            .fetch_balance_and_positions()
            .await
            .map_err(BotError::DataFetch)?;
        report.push_verbose(format!("total equity: {}", account.total_equity));

        let assessment = evaluator::evaluate(&account.positions, &self.config);

        let bias = self.signal_bias(&summaries)?;

        let directive = planner::plan(&assessment, bias, account.total_equity, &self.config);

        match &directive {
            TradeDirective::NoAction => {
                report.push_verbose("no action this cycle".to_string());
            }
            TradeDirective::Open { side, quantity } => {
                report.push(format!("opening {} x{}", side.as_str(), quantity));
            }
            TradeDirective::Close { side, quantity } => {
                report.push(format!(
                    "closing {} x{} (unrealized {})",
                    side.as_str(),
                    quantity,
                    assessment
                        .position
                        .as_ref()
                        .map(|p| p.unrealized_profit.to_string())
                        .unwrap_or_default()
                ));
            }
        }

        if let Some(outcome) = self.gateway.execute(&directive, &self.config).await {
            match &outcome {
                ExchangeOutcome::Success { order_id } => {
                    report.push(format!("order filled: id {}", order_id));
                }
                ExchangeOutcome::Failure { kind, message } => {
                    let err = BotError::Order {
                        kind: *kind,
                        message: message.clone(),
                    };
                    error!("{}", err);
                    report.push(err.to_string());
                }
            }
        }

        Ok(CycleContext {
            summaries,
            account,
            assessment,
            bias,
            directive,
        })
    }

    /// Fetches and summarizes every configured timeframe.
    async fn fetch_summaries(
        &self,
        report: &mut CycleReport,
    ) -> Result<HashMap<String, TimeframeSummary>, BotError> {
        let mut summaries = HashMap::new();
        for tf in &self.config.timeframes {
            let candles = self
                .client
                .fetch_candles(&self.config.symbol, &tf.interval, tf.count)
                .await
                .map_err(BotError::DataFetch)?;
            let summary = summarize(candles)?;
            report.push_verbose(format!(
                "{}: high {} low {} avg {} last {}",
                tf.interval, summary.high, summary.low, summary.average, summary.last_price
            ));
            summaries.insert(tf.interval.clone(), summary);
        }
        Ok(summaries)
    }

    /// The first configured timeframe is the signal timeframe; the bias
    /// needs its three newest candles.
    fn signal_bias(&self, summaries: &HashMap<String, TimeframeSummary>) -> Result<Bias, BotError> {
        let interval = &self.config.timeframes[0].interval;
        let summary = summaries.get(interval).ok_or(BotError::EmptyCandles)?;
        let tail = newest(summary, 3);
        if tail.len() < 3 {
            // Not enough history to vote; treat as no bias rather than an
            // aborted cycle.
            return Ok(Bias::None);
        }
        let triple = [tail[0].clone(), tail[1].clone(), tail[2].clone()];
        Ok(signal::evaluate(&triple, self.config.signal_polarity))
    }
}
