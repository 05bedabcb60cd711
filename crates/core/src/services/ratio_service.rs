use crate::errors::CoreError;
use crate::llm::{CompletionRequest, LlmClient};
use crate::models::ratios::{RatioAnalysis, RatioComparison, RatioSet};
use crate::prompt;
use crate::providers::traits::RatioProvider;

/// Builds ratio comparisons (ticker vs. peer average) and their
/// narrative analyses.
pub struct RatioService;

impl RatioService {
    pub fn new() -> Self {
        Self
    }

    /// Fetch a ticker's ratios and its peers' ratios, and average the
    /// peers into a parallel set.
    pub async fn ratio_comparison(
        &self,
        ratios: &dyn RatioProvider,
        ticker: &str,
    ) -> Result<RatioComparison, CoreError> {
        let own = ratios.ratios(ticker).await?;
        let peer_sets = ratios.peer_ratios(ticker).await?;
        let peer_average = Self::average_ratios(&own, &peer_sets);

        Ok(RatioComparison {
            ticker: own.ticker.clone(),
            own,
            peer_average,
        })
    }

    /// Average each of `own`'s ratios across the peer sets, ignoring
    /// missing values. A ratio no peer reports stays `None`.
    pub fn average_ratios(own: &RatioSet, peers: &[RatioSet]) -> RatioSet {
        let mut average = RatioSet::new("Peers");
        for name in own.names() {
            let values: Vec<f64> = peers.iter().filter_map(|set| set.get(name)).collect();
            let mean = if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            };
            average.push(name, mean);
        }
        average
    }

    /// Fetch the comparison and produce its narrative analysis.
    pub async fn analyze_ratios(
        &self,
        ratios: &dyn RatioProvider,
        llm: &dyn LlmClient,
        ticker: &str,
    ) -> Result<RatioAnalysis, CoreError> {
        let comparison = self.ratio_comparison(ratios, ticker).await?;
        let narrative = llm
            .complete(CompletionRequest::new(
                prompt::ratio_comparison_prompt(&comparison),
                prompt::ANALYSIS_MAX_TOKENS,
            ))
            .await?;

        Ok(RatioAnalysis {
            comparison,
            narrative,
        })
    }
}

impl Default for RatioService {
    fn default() -> Self {
        Self::new()
    }
}
