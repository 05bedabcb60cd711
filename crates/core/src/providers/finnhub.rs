use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::ratios::RatioSet;

use super::traits::RatioProvider;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER: &str = "Finnhub";

/// Ratio display name → Finnhub metric field, in display order.
const RATIO_FIELDS: &[(&str, &str)] = &[
    ("P/E Ratio", "peTTM"),
    ("P/B Ratio", "pb"),
    ("P/S Ratio", "psTTM"),
    ("Dividend Yield", "currentDividendYieldTTM"),
    ("ROE", "roeTTM"),
    ("ROA", "roaTTM"),
    ("Debt-to-Equity Ratio", "totalDebt/totalEquityQuarterly"),
    ("Current Ratio", "currentRatioQuarterly"),
    ("Quick Ratio", "quickRatioQuarterly"),
    ("Operating Margin", "operatingMarginTTM"),
    ("Gross Margin", "grossMarginTTM"),
    ("Price-to-Cash Flow", "pcfShareTTM"),
];

/// Finnhub API provider for financial ratios and peer lists.
///
/// - **Requires**: API key (`FINNHUB_API_KEY`).
/// - `/stock/metric?metric=all` returns a large metrics object; only the
///   twelve named ratios above are kept.
/// - `/stock/peers` returns peer tickers (including the queried one,
///   which is excluded here).
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }

    /// Map a raw Finnhub metrics object onto the named ratio set.
    pub fn map_metrics(ticker: &str, metrics: &Map<String, Value>) -> RatioSet {
        let mut set = RatioSet::new(ticker.to_uppercase());
        for (label, field) in RATIO_FIELDS {
            set.push(*label, metrics.get(*field).and_then(Value::as_f64));
        }
        set
    }

    async fn fetch_metrics(&self, ticker: &str) -> Result<RatioSet, CoreError> {
        tracing::info!(ticker, "fetching ratios");
        let resp: MetricResponse = self
            .client
            .get(format!("{BASE_URL}/stock/metric"))
            .query(&[
                ("symbol", ticker.to_uppercase().as_str()),
                ("metric", "all"),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse metrics for {ticker}: {e}"),
            })?;

        Ok(Self::map_metrics(ticker, &resp.metric))
    }
}

// ── Finnhub API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct MetricResponse {
    #[serde(default)]
    metric: Map<String, Value>,
}

#[async_trait]
impl RatioProvider for FinnhubProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn ratios(&self, ticker: &str) -> Result<RatioSet, CoreError> {
        self.fetch_metrics(ticker).await
    }

    async fn peer_ratios(&self, ticker: &str) -> Result<Vec<RatioSet>, CoreError> {
        let peers: Vec<String> = self
            .client
            .get(format!("{BASE_URL}/stock/peers"))
            .query(&[
                ("symbol", ticker.to_uppercase().as_str()),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse peers for {ticker}: {e}"),
            })?;

        // One metrics call per peer, sequentially.
        let mut sets = Vec::new();
        for peer in peers.iter().filter(|p| !p.eq_ignore_ascii_case(ticker)) {
            sets.push(self.fetch_metrics(peer).await?);
        }
        Ok(sets)
    }
}
