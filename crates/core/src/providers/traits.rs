use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::news::NewsArticle;
use crate::models::price::PriceBar;
use crate::models::profile::CompanyProfile;
use crate::models::ratios::RatioSet;
use crate::models::statement::FinancialStatement;

/// Financial-statements API: the three statements plus company profiles.
///
/// Each provider reshapes its raw JSON into tabular form before handing
/// it back; no retry, pagination, or rate-limit handling anywhere. If an
/// API stops working or changes, we replace only that one implementation.
#[async_trait]
pub trait FinancialsProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    async fn balance_sheet(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError>;

    async fn income_statement(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError>;

    async fn cash_flow(&self, ticker: &str, years: u32)
        -> Result<FinancialStatement, CoreError>;

    /// Returns an empty placeholder when the provider has no data for
    /// the ticker.
    async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile, CoreError>;
}

/// Ratios API: named financial ratios for a ticker and for its peers.
#[async_trait]
pub trait RatioProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn ratios(&self, ticker: &str) -> Result<RatioSet, CoreError>;

    /// One ratio set per peer company, the queried ticker excluded.
    async fn peer_ratios(&self, ticker: &str) -> Result<Vec<RatioSet>, CoreError>;
}

impl std::fmt::Debug for dyn RatioProvider + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatioProvider")
            .field("name", &self.name())
            .finish()
    }
}

/// Historical-price API: OHLC bars at a monthly interval.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Returns bars sorted by date ascending.
    async fn monthly_history(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>, CoreError>;
}

/// News API: recent articles for a ticker.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn articles(&self, ticker: &str, limit: u32) -> Result<Vec<NewsArticle>, CoreError>;
}
