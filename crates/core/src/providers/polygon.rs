use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::news::NewsArticle;

use super::traits::NewsProvider;

const BASE_URL: &str = "https://api.polygon.io";
const PROVIDER: &str = "Polygon";

/// Polygon API provider for ticker news.
///
/// - **Requires**: API key (`POLYGON_API_KEY`).
/// - `/v2/reference/news` by ticker + limit; no pagination — one page of
///   headlines is all the sentiment flow needs.
pub struct PolygonProvider {
    client: Client,
    api_key: String,
}

impl PolygonProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }
}

// ── Polygon API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsResult>,
}

#[derive(Deserialize)]
struct NewsResult {
    title: String,
    description: Option<String>,
    published_utc: Option<DateTime<Utc>>,
}

#[async_trait]
impl NewsProvider for PolygonProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn articles(&self, ticker: &str, limit: u32) -> Result<Vec<NewsArticle>, CoreError> {
        tracing::info!(ticker, limit, "fetching news articles");
        let limit_str = limit.to_string();
        let resp: NewsResponse = self
            .client
            .get(format!("{BASE_URL}/v2/reference/news"))
            .query(&[
                ("ticker", ticker.to_uppercase().as_str()),
                ("limit", limit_str.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse news for {ticker}: {e}"),
            })?;

        Ok(resp
            .results
            .into_iter()
            .map(|result| NewsArticle {
                title: result.title,
                description: result.description,
                published_at: result.published_utc,
            })
            .collect())
    }
}
