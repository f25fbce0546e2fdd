// src/connectors/binance.rs
use crate::connectors::traits::{ExchangeClient, ExchangeError};
use crate::types::{AccountSnapshot, Candle, Position, PositionSide, Side};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::info;

type HmacSha256 = Hmac<Sha256>;

const MAINNET_URL: &str = "https://fapi.binance.com";
const TESTNET_URL: &str = "https://testnet.binancefuture.com";

// "No need to change margin type" / "No need to change position side".
// Preconditions are re-affirmed every cycle, so these are not failures.
const ERR_MARGIN_MODE_NO_CHANGE: i64 = -4046;
const ERR_POSITION_MODE_NO_CHANGE: i64 = -4059;

/// Binance USDT-M futures REST client. Every call carries the configured
/// timeout so a stuck request can never stall a cycle past its bound.
pub struct BinanceFuturesClient {
    api_key: String,
    secret_key: String,
    http_client: Client,
    base_rest_url: String,
}

#[derive(Debug, Deserialize)]
struct BinanceApiError {
    code: i64,
    msg: String,
}

impl BinanceFuturesClient {
    pub fn new(api_key: String, secret_key: String, timeout: Duration, testnet: bool) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        let base_rest_url = if testnet { TESTNET_URL } else { MAINNET_URL };

        Ok(Self {
            api_key,
            secret_key,
            http_client,
            base_rest_url: base_rest_url.to_string(),
        })
    }

    fn sign_and_build_query(&self, params: Vec<(&str, String)>) -> Result<String, ExchangeError> {
        let mut params = params;
        let timestamp = Utc::now().timestamp_millis().to_string();
        params.push(("timestamp", timestamp));

        let query_string = serde_urlencoded::to_string(&params)
            .map_err(|e| ExchangeError::Unknown(format!("query encoding failed: {}", e)))?;

        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .map_err(|_| ExchangeError::Unknown("invalid secret key length".into()))?;
        mac.update(query_string.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}&signature={}", query_string, signature))
    }

    fn classify_transport(err: reqwest::Error) -> ExchangeError {
        if err.is_timeout() || err.is_connect() {
            ExchangeError::Network(err.to_string())
        } else if err.is_status() {
            ExchangeError::Rejected(err.to_string())
        } else {
            ExchangeError::Unknown(err.to_string())
        }
    }

    /// Non-2xx responses carry a `{code, msg}` body; surface it as a
    /// rejection so the caller sees the exchange's own words.
    async fn check_status(response: Response) -> Result<Response, ExchangeError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<BinanceApiError>(&body) {
            Ok(api_err) => Err(ExchangeError::Rejected(format!(
                "code {}: {}",
                api_err.code, api_err.msg
            ))),
            Err(_) => Err(ExchangeError::Rejected(format!("HTTP {}: {}", status, body))),
        }
    }

    async fn send_signed_request<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        endpoint: &str,
        params: Vec<(&str, String)>,
    ) -> Result<T, ExchangeError> {
        let full_query = self.sign_and_build_query(params)?;
        let url = format!("{}{}?{}", self.base_rest_url, endpoint, full_query);

        let response = self
            .http_client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ExchangeError::Unknown(format!("response decoding failed: {}", e)))
    }

    /// "Nothing to change" rejections from the idempotent precondition
    /// endpoints are success.
    fn absorb_no_change(result: Result<serde_json::Value, ExchangeError>, code: i64) -> Result<(), ExchangeError> {
        match result {
            Ok(_) => Ok(()),
            Err(ExchangeError::Rejected(msg)) if msg.starts_with(&format!("code {}:", code)) => {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn decimal_field(value: &serde_json::Value, context: &str) -> Result<Decimal, ExchangeError> {
    value
        .as_str()
        .and_then(|s| Decimal::from_str(s).ok())
        .ok_or_else(|| ExchangeError::Unknown(format!("failed to parse {} from kline", context)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountPosition {
    symbol: String,
    position_side: String,
    entry_price: String,
    initial_margin: String,
    leverage: String,
    unrealized_profit: String,
    position_amt: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    total_margin_balance: String,
    positions: Vec<AccountPosition>,
}

fn parse_decimal(s: &str, field: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(s)
        .map_err(|e| ExchangeError::Unknown(format!("failed to parse {} '{}': {}", field, s, e)))
}

impl AccountPosition {
    fn into_position(self) -> Result<Option<Position>, ExchangeError> {
        // One-way mode legs report "BOTH"; the engine only manages hedge legs.
        let side = match self.position_side.as_str() {
            "LONG" => PositionSide::Long,
            "SHORT" => PositionSide::Short,
            _ => return Ok(None),
        };
        Ok(Some(Position {
            symbol: self.symbol,
            side,
            entry_price: parse_decimal(&self.entry_price, "entryPrice")?,
            initial_margin: parse_decimal(&self.initial_margin, "initialMargin")?,
            leverage: parse_decimal(&self.leverage, "leverage")?,
            unrealized_profit: parse_decimal(&self.unrealized_profit, "unrealizedProfit")?,
            amount_abs: parse_decimal(&self.position_amt, "positionAmt")?.abs(),
        }))
    }
}

#[async_trait]
impl ExchangeClient for BinanceFuturesClient {
    async fn ping(&self) -> Result<(), ExchangeError> {
        let url = format!("{}/fapi/v1/ping", self.base_rest_url);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Self::classify_transport)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        count: u32,
    ) -> Result<Vec<Candle>, ExchangeError> {
        let url = format!(
            "{}/fapi/v1/klines?symbol={}&interval={}&limit={}",
            self.base_rest_url, symbol, interval, count
        );
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Self::classify_transport)?;
        let response = Self::check_status(response).await?;

        // Klines come as positional arrays:
        // [openTime, open, high, low, close, volume, closeTime, ...]
        let rows: Vec<Vec<serde_json::Value>> = response
            .json()
            .await
            .map_err(|e| ExchangeError::Unknown(format!("kline decoding failed: {}", e)))?;

        let mut candles = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() < 6 {
                return Err(ExchangeError::Unknown(format!(
                    "kline row too short: {} fields",
                    row.len()
                )));
            }
            let timestamp = row[0]
                .as_i64()
                .ok_or_else(|| ExchangeError::Unknown("kline open time is not an integer".into()))?;
            candles.push(Candle {
                timestamp,
                open: decimal_field(&row[1], "open")?,
                high: decimal_field(&row[2], "high")?,
                low: decimal_field(&row[3], "low")?,
                close: decimal_field(&row[4], "close")?,
                volume: decimal_field(&row[5], "volume")?,
            });
        }
        Ok(candles)
    }

    async fn fetch_balance_and_positions(&self) -> Result<AccountSnapshot, ExchangeError> {
        let account: AccountInfo = self
            .send_signed_request(Method::GET, "/fapi/v2/account", vec![])
            .await?;

        let total_equity = parse_decimal(&account.total_margin_balance, "totalMarginBalance")?;
        let mut positions = Vec::new();
        for raw in account.positions {
            if let Some(position) = raw.into_position()? {
                positions.push(position);
            }
        }

        Ok(AccountSnapshot {
            total_equity,
            positions,
        })
    }

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), ExchangeError> {
        let params = vec![
            ("symbol", symbol.to_string()),
            ("leverage", leverage.to_string()),
        ];
        self.send_signed_request::<serde_json::Value>(Method::POST, "/fapi/v1/leverage", params)
            .await?;
        Ok(())
    }

    async fn set_margin_mode(&self, symbol: &str, margin_mode: &str) -> Result<(), ExchangeError> {
        let params = vec![
            ("symbol", symbol.to_string()),
            ("marginType", margin_mode.to_string()),
        ];
        let result = self
            .send_signed_request::<serde_json::Value>(Method::POST, "/fapi/v1/marginType", params)
            .await;
        Self::absorb_no_change(result, ERR_MARGIN_MODE_NO_CHANGE)
    }

    async fn set_position_mode(&self, hedged: bool) -> Result<(), ExchangeError> {
        let params = vec![("dualSidePosition", hedged.to_string())];
        let result = self
            .send_signed_request::<serde_json::Value>(
                Method::POST,
                "/fapi/v1/positionSide/dual",
                params,
            )
            .await;
        Self::absorb_no_change(result, ERR_POSITION_MODE_NO_CHANGE)
    }

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        position_side: PositionSide,
    ) -> Result<String, ExchangeError> {
        let params = vec![
            ("symbol", symbol.to_string()),
            ("side", side.as_str().to_string()),
            ("positionSide", position_side.as_str().to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", quantity.to_string()),
        ];

        #[derive(Deserialize)]
        struct OrderResponse {
            #[serde(rename = "orderId")]
            order_id: u64,
        }

        info!(
            "🚀 Sending Order: {} {} {} ({})",
            side.as_str(),
            quantity,
            symbol,
            position_side.as_str()
        );

        let resp: OrderResponse = self
            .send_signed_request(Method::POST, "/fapi/v1/order", params)
            .await?;

        Ok(resp.order_id.to_string())
    }
}
