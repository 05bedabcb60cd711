use chrono::{Duration, Utc};

use crate::errors::CoreError;
use crate::llm::{CompletionRequest, LlmClient};
use crate::models::portfolio::{PortfolioAnalysis, PortfolioEntry, PortfolioPosition};
use crate::models::session::AnalysisSession;
use crate::prompt;
use crate::providers::traits::{FinancialsProvider, HistoryProvider, RatioProvider};

/// Aggregates per-stock data into a weighted portfolio summary and
/// drives the portfolio analysis + follow-up conversation.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Fetch a year of monthly history, the ratio set, and the company
    /// profile for each position — one position at a time, each fetch
    /// blocking the next. The latest monthly close doubles as the
    /// current price; a ticker with no history keeps `None` and simply
    /// carries zero weight.
    pub async fn fetch_portfolio(
        &self,
        positions: &[PortfolioPosition],
        history: &dyn HistoryProvider,
        ratios: &dyn RatioProvider,
        financials: &dyn FinancialsProvider,
    ) -> Result<Vec<PortfolioEntry>, CoreError> {
        let to = Utc::now().date_naive();
        let from = to - Duration::days(365);

        let mut entries = Vec::with_capacity(positions.len());
        for position in positions {
            tracing::info!(ticker = %position.ticker, "fetching portfolio entry");
            let bars = history.monthly_history(&position.ticker, from, to).await?;
            let current_price = bars.last().map(|bar| bar.close);
            let ratio_set = ratios.ratios(&position.ticker).await?;
            let profile = financials.company_profile(&position.ticker).await?;

            entries.push(PortfolioEntry {
                position: position.clone(),
                current_price,
                history: bars,
                ratios: ratio_set,
                profile,
            });
        }
        Ok(entries)
    }

    /// Each entry's weight as a fraction of total market value; the
    /// weights sum to 1.0. A portfolio with no market value is an error,
    /// not a division by zero.
    pub fn compute_weights(entries: &[PortfolioEntry]) -> Result<Vec<f64>, CoreError> {
        let total: f64 = entries.iter().map(PortfolioEntry::market_value).sum();
        if total <= 0.0 {
            return Err(CoreError::Validation(
                "portfolio has no market value — no weights can be computed".into(),
            ));
        }
        Ok(entries
            .iter()
            .map(|entry| entry.market_value() / total)
            .collect())
    }

    /// Fetch everything, weigh it, analyze it, and remember the
    /// narrative in the session for follow-up questions.
    pub async fn analyze_portfolio(
        &self,
        session: &mut AnalysisSession,
        positions: &[PortfolioPosition],
        history: &dyn HistoryProvider,
        ratios: &dyn RatioProvider,
        financials: &dyn FinancialsProvider,
        llm: &dyn LlmClient,
    ) -> Result<PortfolioAnalysis, CoreError> {
        let entries = self
            .fetch_portfolio(positions, history, ratios, financials)
            .await?;
        let weights = Self::compute_weights(&entries)?;

        let narrative = llm
            .complete(CompletionRequest::new(
                prompt::portfolio_prompt(&entries, &weights),
                prompt::ANALYSIS_MAX_TOKENS,
            ))
            .await?;

        session.set_portfolio_analysis(narrative.clone());

        Ok(PortfolioAnalysis {
            entries,
            weights,
            narrative,
        })
    }

    /// Answer a follow-up question against the session's last portfolio
    /// analysis. The combined input is capped (suffix kept, "..."
    /// prefix) before it goes to the model.
    pub async fn follow_up(
        &self,
        session: &mut AnalysisSession,
        llm: &dyn LlmClient,
        question: &str,
    ) -> Result<String, CoreError> {
        let previous = session.portfolio_analysis().ok_or_else(|| {
            CoreError::Validation(
                "no portfolio analysis in this session yet — run one before asking follow-ups"
                    .into(),
            )
        })?;

        let prompt_text = prompt::follow_up_prompt(question, previous);
        let answer = llm
            .complete(CompletionRequest::new(
                prompt_text,
                prompt::FOLLOW_UP_MAX_TOKENS,
            ))
            .await?;

        session.record_follow_up(question.to_string(), answer.clone());
        Ok(answer)
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
