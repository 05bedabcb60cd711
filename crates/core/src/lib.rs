pub mod errors;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod services;

use errors::CoreError;
use llm::openai::OpenAiClient;
use llm::LlmClient;
use models::news::SentimentReport;
use models::portfolio::{PortfolioAnalysis, PortfolioPosition};
use models::ratios::{RatioAnalysis, RatioComparison};
use models::session::AnalysisSession;
use models::settings::Settings;
use models::statement::{FinancialStatement, StatementAnalysis, StatementKind};
use providers::registry::ProviderRegistry;
use services::news_service::NewsService;
use services::portfolio_service::PortfolioService;
use services::ratio_service::RatioService;
use services::statement_service::StatementService;

/// Main entry point for the finsight core library.
///
/// Owns the provider registry, the LLM client, and the services. Every
/// public operation validates its inputs before making any network
/// call; every failure is scoped to the single call that raised it.
#[must_use]
pub struct StockAnalyzer {
    registry: ProviderRegistry,
    llm: Box<dyn LlmClient>,
    statement_service: StatementService,
    ratio_service: RatioService,
    portfolio_service: PortfolioService,
    news_service: NewsService,
}

impl std::fmt::Debug for StockAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockAnalyzer")
            .field("llm", &self.llm.name())
            .finish()
    }
}

impl StockAnalyzer {
    /// Build from environment variables (`FMP_API_KEY`, `OPENAI_API_KEY`
    /// required).
    pub fn from_env() -> Result<Self, CoreError> {
        Self::new(Settings::from_env()?)
    }

    /// Build from explicit settings: default providers for every
    /// configured API key, OpenAI for completions.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        let registry = ProviderRegistry::new_with_defaults(&settings);
        let llm = Box::new(OpenAiClient::from_settings(&settings)?);
        Ok(Self::with_components(registry, llm))
    }

    /// Build from pre-constructed components. This is the seam tests use
    /// to inject mock providers and a mock LLM.
    pub fn with_components(registry: ProviderRegistry, llm: Box<dyn LlmClient>) -> Self {
        Self {
            registry,
            llm,
            statement_service: StatementService::new(),
            ratio_service: RatioService::new(),
            portfolio_service: PortfolioService::new(),
            news_service: NewsService::new(),
        }
    }

    /// Start a fresh per-user session for portfolio analysis and
    /// follow-up questions.
    pub fn new_session(&self) -> AnalysisSession {
        AnalysisSession::new()
    }

    // ── Financial statements ────────────────────────────────────────

    /// Fetch the balance sheet table for the last `years` annual reports.
    pub async fn balance_sheet(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        self.fetch_statement(StatementKind::BalanceSheet, ticker, years)
            .await
    }

    pub async fn income_statement(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        self.fetch_statement(StatementKind::IncomeStatement, ticker, years)
            .await
    }

    pub async fn cash_flow(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        self.fetch_statement(StatementKind::CashFlow, ticker, years)
            .await
    }

    /// All three statements stacked into one table with separator rows.
    pub async fn combined_statements(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        self.fetch_statement(StatementKind::Combined, ticker, years)
            .await
    }

    pub async fn analyze_balance_sheet(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<StatementAnalysis, CoreError> {
        self.analyze_statement(StatementKind::BalanceSheet, ticker, years)
            .await
    }

    pub async fn analyze_income_statement(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<StatementAnalysis, CoreError> {
        self.analyze_statement(StatementKind::IncomeStatement, ticker, years)
            .await
    }

    pub async fn analyze_cash_flow(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<StatementAnalysis, CoreError> {
        self.analyze_statement(StatementKind::CashFlow, ticker, years)
            .await
    }

    /// Comprehensive analysis over the combined statements.
    pub async fn analyze_full_picture(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<StatementAnalysis, CoreError> {
        self.analyze_statement(StatementKind::Combined, ticker, years)
            .await
    }

    // ── Ratio comparison ────────────────────────────────────────────

    /// A ticker's ratios next to the average across its peers.
    pub async fn ratio_comparison(&self, ticker: &str) -> Result<RatioComparison, CoreError> {
        let ticker = validate_ticker(ticker)?;
        self.ratio_service
            .ratio_comparison(self.registry.ratios()?, &ticker)
            .await
    }

    pub async fn analyze_ratios(&self, ticker: &str) -> Result<RatioAnalysis, CoreError> {
        let ticker = validate_ticker(ticker)?;
        self.ratio_service
            .analyze_ratios(self.registry.ratios()?, self.llm.as_ref(), &ticker)
            .await
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Fetch every position's data, weigh the portfolio, and produce a
    /// narrative analysis. The narrative is remembered in `session` so
    /// follow-up questions can refer back to it.
    pub async fn analyze_portfolio(
        &self,
        session: &mut AnalysisSession,
        positions: &[PortfolioPosition],
    ) -> Result<PortfolioAnalysis, CoreError> {
        if positions.is_empty() {
            return Err(CoreError::MissingField("Portfolio".into()));
        }
        for position in positions {
            if position.ticker.trim().is_empty() {
                return Err(CoreError::MissingField("Ticker".into()));
            }
            if position.shares <= 0.0 {
                return Err(CoreError::Validation(format!(
                    "Share count for {} must be positive",
                    position.ticker
                )));
            }
        }

        self.portfolio_service
            .analyze_portfolio(
                session,
                positions,
                self.registry.history()?,
                self.registry.ratios()?,
                self.registry.financials()?,
                self.llm.as_ref(),
            )
            .await
    }

    /// Answer a follow-up question about the session's last portfolio
    /// analysis.
    pub async fn follow_up(
        &self,
        session: &mut AnalysisSession,
        question: &str,
    ) -> Result<String, CoreError> {
        if question.trim().is_empty() {
            return Err(CoreError::MissingField("Question".into()));
        }
        self.portfolio_service
            .follow_up(session, self.llm.as_ref(), question)
            .await
    }

    // ── News sentiment ──────────────────────────────────────────────

    /// Fetch up to `limit` headlines and classify each one's sentiment.
    pub async fn news_sentiment(
        &self,
        ticker: &str,
        limit: u32,
    ) -> Result<SentimentReport, CoreError> {
        let ticker = validate_ticker(ticker)?;
        if limit == 0 {
            return Err(CoreError::Validation(
                "Headline count must be at least 1".into(),
            ));
        }
        self.news_service
            .sentiment_report(self.registry.news()?, self.llm.as_ref(), &ticker, limit)
            .await
    }

    // ── Internal ────────────────────────────────────────────────────

    async fn fetch_statement(
        &self,
        kind: StatementKind,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        let ticker = validate_ticker(ticker)?;
        validate_years(years)?;
        self.statement_service
            .fetch_statement(self.registry.financials()?, kind, &ticker, years)
            .await
    }

    async fn analyze_statement(
        &self,
        kind: StatementKind,
        ticker: &str,
        years: u32,
    ) -> Result<StatementAnalysis, CoreError> {
        let ticker = validate_ticker(ticker)?;
        validate_years(years)?;
        self.statement_service
            .analyze_statement(
                self.registry.financials()?,
                self.llm.as_ref(),
                kind,
                &ticker,
                years,
            )
            .await
    }
}

fn validate_ticker(ticker: &str) -> Result<String, CoreError> {
    let trimmed = ticker.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingField("Ticker".into()));
    }
    Ok(trimmed.to_uppercase())
}

fn validate_years(years: u32) -> Result<(), CoreError> {
    if years == 0 {
        return Err(CoreError::MissingField("Years".into()));
    }
    Ok(())
}
