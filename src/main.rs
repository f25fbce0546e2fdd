// src/main.rs
use dotenvy::dotenv;
use leverbot::config::AppConfig;
use leverbot::connectors::binance::BinanceFuturesClient;
use leverbot::connectors::traits::ExchangeClient;
use leverbot::core::engine::Engine;
use leverbot::notify::{LogNotifier, ReporterHandle};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Malformed or missing configuration is fatal here and nowhere else.
    let config = AppConfig::new()?;

    println!("========================================");
    println!("       LEVERBOT - v0.1.0");
    println!("========================================");
    println!("Target:   {}", config.symbol);
    println!("Leverage: {}x ({:?})", config.leverage, config.margin_mode);
    println!(
        "Mode:     {}",
        if config.trading_enabled {
            "🚨 LIVE TRADING"
        } else {
            "📝 OBSERVE ONLY"
        }
    );
    if config.testnet {
        println!("Network:  testnet");
    }
    println!("========================================");

    let client = Arc::new(BinanceFuturesClient::new(
        config.api_key.clone(),
        config.secret_key.clone(),
        Duration::from_secs(config.http_timeout_secs),
        config.testnet,
    )?);

    // Startup connectivity check; after this, failures are per-cycle only.
    client.ping().await?;
    info!("Exchange reachable, starting engine");

    let reporter = ReporterHandle::new();
    // The external command listener would hold a clone of `reporter` and
    // flip subscription/verbosity; default to subscribed logs.
    reporter.subscribe();

    let engine = Engine::new(config, client, reporter, Box::new(LogNotifier));

    tokio::select! {
        _ = engine.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested, exiting");
        }
    }
    Ok(())
}
