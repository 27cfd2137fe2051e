//! HTTP JSON candle source.
//!
//! `GET {base}/candles?symbol=EURUSD&timeframe=1h&count=100` answering with
//! `[{"t": 1700000000000, "o": "1.1", "h": "1.2", "l": "1.0", "c": "1.15", "v": "10"}]`.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use super::market_data::CandleDataSource;
use crate::error::ProviderError;
use crate::models::indicators::{Candle, CandleSeries, Timeframe};

const MAX_RETRIES: usize = 2;
const INITIAL_BACKOFF_MS: u64 = 100;

#[derive(Debug, Deserialize)]
struct RawCandle {
    t: i64,
    o: String,
    h: String,
    l: String,
    c: String,
    #[serde(default)]
    v: Option<String>,
}

impl RawCandle {
    fn into_candle(self) -> Result<Candle, ProviderError> {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(self.t).ok_or_else(|| {
            ProviderError::MalformedResponse {
                message: format!("invalid timestamp: {}", self.t),
            }
        })?;
        Ok(Candle::new(
            parse_decimal("open", &self.o)?,
            parse_decimal("high", &self.h)?,
            parse_decimal("low", &self.l)?,
            parse_decimal("close", &self.c)?,
            match self.v {
                Some(ref v) => parse_decimal("volume", v)?,
                None => Decimal::ZERO,
            },
            timestamp,
        ))
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ProviderError> {
    Decimal::from_str(raw.trim()).map_err(|e| ProviderError::MalformedResponse {
        message: format!("invalid {} '{}': {}", field, raw, e),
    })
}

pub struct RestCandleSource {
    base_url: String,
    client: reqwest::Client,
    initial_backoff: Duration,
}

impl RestCandleSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    async fn fetch_once(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<CandleSeries, ProviderError> {
        let url = format!("{}/candles", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("timeframe", timeframe.as_str().to_string()),
                ("count", count.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
            StatusCode::NOT_FOUND => {
                return Err(ProviderError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            status if status.is_server_error() => {
                return Err(ProviderError::Transport {
                    message: format!("server returned {}", status),
                })
            }
            status if !status.is_success() => {
                return Err(ProviderError::MalformedResponse {
                    message: format!("unexpected status {}", status),
                })
            }
            _ => {}
        }

        let raw: Vec<RawCandle> =
            response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse {
                    message: e.to_string(),
                })?;

        let candles = raw
            .into_iter()
            .map(RawCandle::into_candle)
            .collect::<Result<Vec<_>, _>>()?;
        let series = CandleSeries::from_candles(candles);
        let start = series.len().saturating_sub(count);
        Ok(CandleSeries::from_candles(series[start..].to_vec()))
    }
}

#[async_trait]
impl CandleDataSource for RestCandleSource {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<CandleSeries, ProviderError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.initial_backoff)
            .with_max_times(MAX_RETRIES);

        (|| self.fetch_once(symbol, timeframe, count))
            .retry(backoff)
            .when(ProviderError::is_retryable)
            .notify(|e: &ProviderError, delay: Duration| {
                warn!(
                    symbol = %symbol,
                    timeframe = %timeframe,
                    stage = "fetch",
                    error = %e,
                    backoff_ms = delay.as_millis() as u64,
                    "RestCandleSource: retryable error for {}, backing off",
                    symbol
                );
            })
            .await
    }

    fn name(&self) -> &str {
        "rest"
    }
}
