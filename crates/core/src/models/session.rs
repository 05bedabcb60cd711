use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One question/answer exchange that followed a portfolio analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpExchange {
    pub question: String,
    pub answer: String,
}

/// Explicit per-session context for portfolio analysis and follow-ups.
///
/// The caller owns one of these per user session and threads it through
/// `analyze_portfolio` / `follow_up`. Nothing here is persisted; the
/// lifetime is whatever the caller decides a session is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub id: Uuid,
    portfolio_analysis: Option<String>,
    follow_ups: Vec<FollowUpExchange>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            portfolio_analysis: None,
            follow_ups: Vec::new(),
        }
    }

    /// The most recent portfolio analysis, if one has been produced.
    pub fn portfolio_analysis(&self) -> Option<&str> {
        self.portfolio_analysis.as_deref()
    }

    /// Store a fresh portfolio analysis. Resets the follow-up history,
    /// since old follow-ups referred to the previous analysis.
    pub fn set_portfolio_analysis(&mut self, analysis: String) {
        self.portfolio_analysis = Some(analysis);
        self.follow_ups.clear();
    }

    pub fn record_follow_up(&mut self, question: String, answer: String) {
        self.follow_ups.push(FollowUpExchange { question, answer });
    }

    pub fn follow_ups(&self) -> &[FollowUpExchange] {
        &self.follow_ups
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}
