use serde::{Deserialize, Serialize};

use super::price::PriceBar;
use super::profile::CompanyProfile;
use super::ratios::RatioSet;

/// User-entered portfolio row: a ticker and a share count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    /// Ticker symbol, uppercased (e.g., "AAPL")
    pub ticker: String,
    pub shares: f64,
}

impl PortfolioPosition {
    pub fn new(ticker: impl Into<String>, shares: f64) -> Self {
        Self {
            ticker: ticker.into().trim().to_uppercase(),
            shares,
        }
    }
}

/// Everything fetched for one portfolio position: a year of monthly
/// history, the latest close, financial ratios, and the company profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub position: PortfolioPosition,
    /// Last monthly close. `None` when the history came back empty.
    pub current_price: Option<f64>,
    pub history: Vec<PriceBar>,
    pub ratios: RatioSet,
    pub profile: CompanyProfile,
}

impl PortfolioEntry {
    /// shares × current price; zero when no price is available.
    pub fn market_value(&self) -> f64 {
        self.current_price
            .map(|price| price * self.position.shares)
            .unwrap_or(0.0)
    }
}

/// Result of a portfolio analysis: the fetched entries, each entry's
/// weight (fraction of total market value, summing to 1.0), and the
/// model's narrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub entries: Vec<PortfolioEntry>,
    pub weights: Vec<f64>,
    pub narrative: String,
}
