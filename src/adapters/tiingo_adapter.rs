//! Tiingo end-of-day price adapter.
//!
//! Issues `GET {base}/tiingo/daily/{symbol}/prices?startDate=..&endDate=..&token=..`
//! and decodes the JSON array of daily prices. One HTTP client is built per
//! adapter and reused for every request.

use crate::domain::candle::Candle;
use crate::domain::error::{MarketDataError, QmoneyError};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.tiingo.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const TOKEN_ENV_VAR: &str = "TIINGO_TOKEN";

pub struct TiingoAdapter {
    client: Client,
    base_url: String,
    token: String,
}

impl TiingoAdapter {
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, QmoneyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QmoneyError::ConfigInvalid {
                section: "tiingo".into(),
                key: "timeout_secs".into(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self::with_client(client, base_url, token))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Build from `[tiingo]` config. The token falls back to `TIINGO_TOKEN`.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, QmoneyError> {
        let token = config
            .get_string("tiingo", "token")
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| QmoneyError::ConfigMissing {
                section: "tiingo".into(),
                key: "token".into(),
            })?;
        let base_url = config
            .get_string("tiingo", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = config
            .get_positive_int("tiingo", "timeout_secs")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(token.trim(), base_url, Duration::from_secs(timeout_secs))
    }

    pub fn build_url(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> String {
        format!(
            "{}/tiingo/daily/{}/prices?startDate={}&endDate={}&token={}",
            self.base_url,
            symbol,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
            self.token
        )
    }
}

/// Decode a Tiingo price array. Extra fields are ignored.
pub fn parse_candles(body: &str) -> Result<Vec<Candle>, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::Malformed(e.to_string()))
}

impl MarketDataPort for TiingoAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Candle>, MarketDataError> {
        if from >= to {
            return Err(MarketDataError::InvalidRange { from, to });
        }

        debug!(symbol, %from, %to, "requesting Tiingo prices");
        // Errors are stripped of the URL so the token never reaches logs.
        let response = self
            .client
            .get(self.build_url(symbol, from, to))
            .send()
            .map_err(|e| MarketDataError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| MarketDataError::Transport(e.without_url().to_string()))?;
        if !status.is_success() {
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let candles = parse_candles(&body)?;
        if candles.is_empty() {
            return Err(MarketDataError::Empty);
        }
        Ok(candles)
    }
}
