use serde::{Deserialize, Serialize};

/// Company profile fields used in portfolio prompts.
///
/// Every field is optional: the profile endpoint returns an empty
/// placeholder for unknown tickers, and prompts render absent values
/// as "N/A".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: Option<String>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub beta: Option<f64>,
}

impl CompanyProfile {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.market_cap.is_none()
            && self.sector.is_none()
            && self.industry.is_none()
            && self.beta.is_none()
    }
}
