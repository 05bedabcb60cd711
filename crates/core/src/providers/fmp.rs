use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::profile::CompanyProfile;
use crate::models::statement::{FinancialStatement, StatementKind};

use super::traits::FinancialsProvider;

const BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
const PROVIDER: &str = "Financial Modeling Prep";

/// Financial Modeling Prep API provider for statements and profiles.
///
/// - **Requires**: API key (`FMP_API_KEY`).
/// - **Endpoints**: `balance-sheet-statement`, `income-statement`,
///   `cash-flow-statement`, `profile` — all keyed by ticker, with
///   `limit` selecting how many annual reports come back.
/// - Statement responses arrive newest-first; the reshape into
///   `FinancialStatement` sorts periods ascending and drops filing
///   metadata columns.
pub struct FmpProvider {
    client: Client,
    api_key: String,
}

impl FmpProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }

    async fn fetch_statement(
        &self,
        endpoint: &str,
        kind: StatementKind,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        tracing::info!(ticker, statement = %kind, years, "fetching statement");
        let limit = years.to_string();
        let reports: Vec<Map<String, Value>> = self
            .client
            .get(format!("{BASE_URL}/{endpoint}/{ticker}"))
            .query(&[("apikey", self.api_key.as_str()), ("limit", limit.as_str())])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse {kind} for {ticker}: {e}"),
            })?;

        FinancialStatement::from_reports(kind, ticker, reports)
    }
}

// ── FMP API response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct ProfileRow {
    #[serde(rename = "companyName")]
    company_name: Option<String>,
    #[serde(rename = "mktCap")]
    mkt_cap: Option<f64>,
    sector: Option<String>,
    industry: Option<String>,
    beta: Option<f64>,
}

impl From<ProfileRow> for CompanyProfile {
    fn from(row: ProfileRow) -> Self {
        CompanyProfile {
            company_name: row.company_name.filter(|s| !s.is_empty()),
            market_cap: row.mkt_cap,
            sector: row.sector.filter(|s| !s.is_empty()),
            industry: row.industry.filter(|s| !s.is_empty()),
            beta: row.beta,
        }
    }
}

#[async_trait]
impl FinancialsProvider for FmpProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn balance_sheet(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        self.fetch_statement(
            "balance-sheet-statement",
            StatementKind::BalanceSheet,
            ticker,
            years,
        )
        .await
    }

    async fn income_statement(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        self.fetch_statement(
            "income-statement",
            StatementKind::IncomeStatement,
            ticker,
            years,
        )
        .await
    }

    async fn cash_flow(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        self.fetch_statement("cash-flow-statement", StatementKind::CashFlow, ticker, years)
            .await
    }

    async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile, CoreError> {
        tracing::info!(ticker, "fetching company profile");
        let rows: Vec<ProfileRow> = self
            .client
            .get(format!("{BASE_URL}/profile/{ticker}"))
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse profile for {ticker}: {e}"),
            })?;

        // Absent data is not an error: the caller renders "N/A".
        Ok(rows
            .into_iter()
            .next()
            .map(CompanyProfile::from)
            .unwrap_or_default())
    }
}
