// ═══════════════════════════════════════════════════════════════════
// Service Tests — StatementService, RatioService, PortfolioService,
// NewsService, driven by mock providers and a recording mock LLM
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use finsight_core::errors::CoreError;
use finsight_core::llm::{CompletionRequest, LlmClient, SamplingParams};
use finsight_core::models::news::{NewsArticle, Sentiment};
use finsight_core::models::price::PriceBar;
use finsight_core::models::profile::CompanyProfile;
use finsight_core::models::ratios::RatioSet;
use finsight_core::models::statement::{FinancialStatement, LineItem, StatementKind};
use finsight_core::models::portfolio::{PortfolioEntry, PortfolioPosition};
use finsight_core::models::session::AnalysisSession;
use finsight_core::providers::traits::{
    FinancialsProvider, HistoryProvider, NewsProvider, RatioProvider,
};
use finsight_core::services::news_service::NewsService;
use finsight_core::services::portfolio_service::PortfolioService;
use finsight_core::services::ratio_service::RatioService;
use finsight_core::services::statement_service::StatementService;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock LLM
// ═══════════════════════════════════════════════════════════════════

/// Records every completion request and answers from a scripted queue,
/// falling back to a fixed default reply once the queue runs dry.
struct RecordingLlm {
    replies: Mutex<VecDeque<String>>,
    default_reply: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingLlm {
    fn new(default_reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: default_reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_replies(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            default_reply: "mock reply".to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for RecordingLlm {
    fn name(&self) -> &str {
        "RecordingLlm"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CoreError> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        Ok(reply.unwrap_or_else(|| self.default_reply.clone()))
    }
}

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

fn statement(kind: StatementKind, ticker: &str, rows: usize, periods: usize) -> FinancialStatement {
    FinancialStatement {
        kind,
        ticker: ticker.to_string(),
        periods: (0..periods)
            .map(|i| NaiveDate::from_ymd_opt(2019 + i as i32, 9, 30).unwrap())
            .collect(),
        line_items: (0..rows)
            .map(|r| LineItem {
                name: format!("item{r}"),
                values: vec![json!(r as i64); periods],
            })
            .collect(),
    }
}

struct MockFinancials {
    bs_rows: usize,
    is_rows: usize,
    cf_rows: usize,
    periods: usize,
    profile: CompanyProfile,
}

impl MockFinancials {
    fn new(bs_rows: usize, is_rows: usize, cf_rows: usize, periods: usize) -> Self {
        Self {
            bs_rows,
            is_rows,
            cf_rows,
            periods,
            profile: CompanyProfile {
                company_name: Some("Apple Inc.".into()),
                market_cap: Some(2_900_000_000_000.0),
                sector: Some("Technology".into()),
                industry: Some("Consumer Electronics".into()),
                beta: Some(1.25),
            },
        }
    }
}

#[async_trait]
impl FinancialsProvider for MockFinancials {
    fn name(&self) -> &str {
        "MockFinancials"
    }

    async fn balance_sheet(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        let periods = self.periods.min(years as usize);
        Ok(statement(
            StatementKind::BalanceSheet,
            ticker,
            self.bs_rows,
            periods,
        ))
    }

    async fn income_statement(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        let periods = self.periods.min(years as usize);
        Ok(statement(
            StatementKind::IncomeStatement,
            ticker,
            self.is_rows,
            periods,
        ))
    }

    async fn cash_flow(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        let periods = self.periods.min(years as usize);
        Ok(statement(
            StatementKind::CashFlow,
            ticker,
            self.cf_rows,
            periods,
        ))
    }

    async fn company_profile(&self, _ticker: &str) -> Result<CompanyProfile, CoreError> {
        Ok(self.profile.clone())
    }
}

/// Serves monthly closes per ticker; unknown tickers get empty history.
struct MockHistory {
    closes: HashMap<String, Vec<f64>>,
}

impl MockHistory {
    fn new(closes: &[(&str, &[f64])]) -> Self {
        Self {
            closes: closes
                .iter()
                .map(|(ticker, prices)| (ticker.to_string(), prices.to_vec()))
                .collect(),
        }
    }
}

#[async_trait]
impl HistoryProvider for MockHistory {
    fn name(&self) -> &str {
        "MockHistory"
    }

    async fn monthly_history(
        &self,
        ticker: &str,
        from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<PriceBar>, CoreError> {
        let closes = self.closes.get(ticker).cloned().unwrap_or_default();
        Ok(closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar {
                date: from + chrono::Duration::days(30 * i as i64),
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1_000,
            })
            .collect())
    }
}

struct MockRatios {
    peers: Vec<RatioSet>,
}

impl MockRatios {
    fn new() -> Self {
        Self { peers: Vec::new() }
    }

    fn with_peers(peers: Vec<RatioSet>) -> Self {
        Self { peers }
    }
}

fn ratio_set(ticker: &str, pe: Option<f64>, roe: Option<f64>) -> RatioSet {
    let mut set = RatioSet::new(ticker);
    set.push("P/E Ratio", pe);
    set.push("ROE", roe);
    set
}

#[async_trait]
impl RatioProvider for MockRatios {
    fn name(&self) -> &str {
        "MockRatios"
    }

    async fn ratios(&self, ticker: &str) -> Result<RatioSet, CoreError> {
        Ok(ratio_set(&ticker.to_uppercase(), Some(28.5), Some(1.47)))
    }

    async fn peer_ratios(&self, _ticker: &str) -> Result<Vec<RatioSet>, CoreError> {
        Ok(self.peers.clone())
    }
}

struct MockNews {
    articles: Vec<NewsArticle>,
}

impl MockNews {
    fn with_titles(titles: &[&str]) -> Self {
        Self {
            articles: titles
                .iter()
                .map(|title| NewsArticle {
                    title: title.to_string(),
                    description: None,
                    published_at: None,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl NewsProvider for MockNews {
    fn name(&self) -> &str {
        "MockNews"
    }

    async fn articles(&self, _ticker: &str, limit: u32) -> Result<Vec<NewsArticle>, CoreError> {
        Ok(self.articles.iter().take(limit as usize).cloned().collect())
    }
}

/// A news provider that always fails, for error-propagation tests.
struct FailingNews;

#[async_trait]
impl NewsProvider for FailingNews {
    fn name(&self) -> &str {
        "FailingNews"
    }

    async fn articles(&self, ticker: &str, _limit: u32) -> Result<Vec<NewsArticle>, CoreError> {
        Err(CoreError::Api {
            provider: "FailingNews".into(),
            message: format!("boom for {ticker}"),
        })
    }
}

fn entry(ticker: &str, shares: f64, price: Option<f64>) -> PortfolioEntry {
    PortfolioEntry {
        position: PortfolioPosition::new(ticker, shares),
        current_price: price,
        history: Vec::new(),
        ratios: ratio_set(ticker, Some(28.5), None),
        profile: CompanyProfile::default(),
    }
}

// ═══════════════════════════════════════════════════════════════════
// StatementService
// ═══════════════════════════════════════════════════════════════════

mod statement_service {
    use super::*;

    #[tokio::test]
    async fn combined_table_has_two_separator_rows() {
        let financials = MockFinancials::new(7, 4, 6, 5);
        let service = StatementService::new();

        let combined = service
            .combined_statements(&financials, "AAPL", 5)
            .await
            .unwrap();

        assert_eq!(combined.row_count(), 7 + 1 + 4 + 1 + 6);
        assert_eq!(combined.kind, StatementKind::Combined);
        assert_eq!(combined.column_count(), 5);
    }

    #[tokio::test]
    async fn fetch_statement_routes_by_kind() {
        let financials = MockFinancials::new(3, 2, 4, 5);
        let service = StatementService::new();

        let income = service
            .fetch_statement(&financials, StatementKind::IncomeStatement, "AAPL", 5)
            .await
            .unwrap();
        assert_eq!(income.kind, StatementKind::IncomeStatement);
        assert_eq!(income.row_count(), 2);

        let cash_flow = service
            .fetch_statement(&financials, StatementKind::CashFlow, "AAPL", 5)
            .await
            .unwrap();
        assert_eq!(cash_flow.row_count(), 4);
    }

    #[tokio::test]
    async fn analyze_statement_returns_table_and_narrative() {
        let financials = MockFinancials::new(3, 2, 4, 5);
        let llm = RecordingLlm::new("the balance sheet looks sturdy");
        let service = StatementService::new();

        let analysis = service
            .analyze_statement(&financials, &llm, StatementKind::BalanceSheet, "AAPL", 5)
            .await
            .unwrap();

        assert_eq!(analysis.narrative, "the balance sheet looks sturdy");
        assert_eq!(analysis.statement.row_count(), 3);

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("balance sheet data"));
        assert_eq!(requests[0].max_tokens, 1000);
    }

    #[tokio::test]
    async fn full_picture_uses_the_comprehensive_template() {
        let financials = MockFinancials::new(2, 2, 2, 3);
        let llm = RecordingLlm::new("comprehensive view");
        let service = StatementService::new();

        service
            .analyze_statement(&financials, &llm, StatementKind::Combined, "AAPL", 3)
            .await
            .unwrap();

        let requests = llm.requests();
        assert!(requests[0]
            .prompt
            .contains("consolidated financial statements"));
    }

    #[tokio::test]
    async fn analysis_requests_use_default_sampling() {
        let financials = MockFinancials::new(2, 2, 2, 3);
        let llm = RecordingLlm::new("ok");
        let service = StatementService::new();

        service
            .analyze_statement(&financials, &llm, StatementKind::CashFlow, "AAPL", 3)
            .await
            .unwrap();

        assert_eq!(llm.requests()[0].sampling, SamplingParams::default());
    }
}

// ═══════════════════════════════════════════════════════════════════
// RatioService
// ═══════════════════════════════════════════════════════════════════

mod ratio_service {
    use super::*;

    #[test]
    fn average_skips_missing_values() {
        let own = ratio_set("AAPL", Some(28.5), Some(1.47));
        let peers = vec![
            ratio_set("MSFT", Some(10.0), None),
            ratio_set("GOOG", None, None),
            ratio_set("META", Some(30.0), None),
        ];

        let average = RatioService::average_ratios(&own, &peers);
        assert_eq!(average.get("P/E Ratio"), Some(20.0));
        assert_eq!(average.get("ROE"), None);
    }

    #[test]
    fn no_peers_means_no_averages() {
        let own = ratio_set("AAPL", Some(28.5), Some(1.47));
        let average = RatioService::average_ratios(&own, &[]);

        let names: Vec<&str> = average.names().collect();
        assert_eq!(names, vec!["P/E Ratio", "ROE"]);
        assert_eq!(average.get("P/E Ratio"), None);
    }

    #[tokio::test]
    async fn comparison_pairs_ticker_with_peer_average() {
        let ratios = MockRatios::with_peers(vec![
            ratio_set("MSFT", Some(20.0), Some(0.5)),
            ratio_set("GOOG", Some(24.0), Some(0.25)),
        ]);
        let service = RatioService::new();

        let comparison = service.ratio_comparison(&ratios, "AAPL").await.unwrap();
        assert_eq!(comparison.ticker, "AAPL");

        let rows = comparison.rows();
        assert_eq!(rows[0], ("P/E Ratio", Some(28.5), Some(22.0)));
        assert_eq!(rows[1], ("ROE", Some(1.47), Some(0.375)));
    }

    #[tokio::test]
    async fn analyze_ratios_prompts_with_the_comparison() {
        let ratios = MockRatios::new();
        let llm = RecordingLlm::new("trading rich against peers");
        let service = RatioService::new();

        let analysis = service.analyze_ratios(&ratios, &llm, "AAPL").await.unwrap();
        assert_eq!(analysis.narrative, "trading rich against peers");

        let requests = llm.requests();
        assert!(requests[0].prompt.contains("- P/E Ratio for AAPL: 28.5"));
        assert_eq!(requests[0].max_tokens, 1000);
    }
}

// ═══════════════════════════════════════════════════════════════════
// PortfolioService — weights
// ═══════════════════════════════════════════════════════════════════

mod portfolio_weights {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let entries = vec![
            entry("AAPL", 3.0, Some(100.0)),
            entry("MSFT", 1.0, Some(200.0)),
            entry("GOOG", 2.0, Some(50.0)),
        ];

        let weights = PortfolioService::compute_weights(&entries).unwrap();
        let sum: f64 = weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((weights[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_value_portfolio_is_an_error_not_a_division() {
        let entries = vec![entry("AAPL", 3.0, None), entry("MSFT", 1.0, None)];
        let err = PortfolioService::compute_weights(&entries).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn unpriced_entry_carries_zero_weight() {
        let entries = vec![entry("AAPL", 2.0, Some(150.0)), entry("ZZZZ", 10.0, None)];
        let weights = PortfolioService::compute_weights(&entries).unwrap();
        assert!((weights[0] - 1.0).abs() < 1e-9);
        assert_eq!(weights[1], 0.0);
    }

    #[test]
    fn empty_entry_list_is_an_error() {
        assert!(PortfolioService::compute_weights(&[]).is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// PortfolioService — fetch & analyze
// ═══════════════════════════════════════════════════════════════════

mod portfolio_analysis {
    use super::*;

    fn positions() -> Vec<PortfolioPosition> {
        vec![
            PortfolioPosition::new("AAPL", 3.0),
            PortfolioPosition::new("MSFT", 1.0),
        ]
    }

    fn history() -> MockHistory {
        MockHistory::new(&[
            ("AAPL", &[90.0, 95.0, 100.0][..]),
            ("MSFT", &[180.0, 190.0, 200.0][..]),
        ])
    }

    #[tokio::test]
    async fn current_price_is_the_last_monthly_close() {
        let service = PortfolioService::new();
        let entries = service
            .fetch_portfolio(
                &positions(),
                &history(),
                &MockRatios::new(),
                &MockFinancials::new(1, 1, 1, 1),
            )
            .await
            .unwrap();

        assert_eq!(entries[0].current_price, Some(100.0));
        assert_eq!(entries[1].current_price, Some(200.0));
        assert_eq!(entries[0].history.len(), 3);
    }

    #[tokio::test]
    async fn unknown_ticker_keeps_no_price() {
        let service = PortfolioService::new();
        let entries = service
            .fetch_portfolio(
                &[PortfolioPosition::new("ZZZZ", 5.0)],
                &history(),
                &MockRatios::new(),
                &MockFinancials::new(1, 1, 1, 1),
            )
            .await
            .unwrap();

        assert_eq!(entries[0].current_price, None);
        assert!(entries[0].history.is_empty());
    }

    #[tokio::test]
    async fn analyze_stores_narrative_in_session() {
        let service = PortfolioService::new();
        let llm = RecordingLlm::new("well diversified for two stocks");
        let mut session = AnalysisSession::new();

        let analysis = service
            .analyze_portfolio(
                &mut session,
                &positions(),
                &history(),
                &MockRatios::new(),
                &MockFinancials::new(1, 1, 1, 1),
                &llm,
            )
            .await
            .unwrap();

        assert_eq!(analysis.narrative, "well diversified for two stocks");
        assert_eq!(
            session.portfolio_analysis(),
            Some("well diversified for two stocks")
        );

        let sum: f64 = analysis.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // AAPL: 3 × 100 = 300 of 500 total
        assert!((analysis.weights[0] - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn analyze_prompt_carries_stock_lines_and_weights() {
        let service = PortfolioService::new();
        let llm = RecordingLlm::new("ok");
        let mut session = AnalysisSession::new();

        service
            .analyze_portfolio(
                &mut session,
                &positions(),
                &history(),
                &MockRatios::new(),
                &MockFinancials::new(1, 1, 1, 1),
                &llm,
            )
            .await
            .unwrap();

        let prompt = &llm.requests()[0].prompt;
        assert!(prompt.contains("Stock: AAPL - Shares: 3"));
        assert!(prompt.contains("Weight in Portfolio: 60.00%."));
        assert!(prompt.contains("Sector: Technology"));
        assert!(prompt.contains("P/E Ratio: 28.5"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// PortfolioService — follow-up questions
// ═══════════════════════════════════════════════════════════════════

mod follow_up {
    use super::*;

    #[tokio::test]
    async fn requires_a_prior_analysis() {
        let service = PortfolioService::new();
        let llm = RecordingLlm::new("never called");
        let mut session = AnalysisSession::new();

        let err = service
            .follow_up(&mut session, &llm, "what about beta?")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn combines_question_with_previous_analysis() {
        let service = PortfolioService::new();
        let llm = RecordingLlm::new("beta is manageable");
        let mut session = AnalysisSession::new();
        session.set_portfolio_analysis("The portfolio tilts heavily toward tech.".into());

        let answer = service
            .follow_up(&mut session, &llm, "what about beta?")
            .await
            .unwrap();
        assert_eq!(answer, "beta is manageable");

        let requests = llm.requests();
        assert!(requests[0]
            .prompt
            .contains("The portfolio tilts heavily toward tech."));
        assert!(requests[0].prompt.ends_with("Follow-up Question: what about beta?"));
        assert_eq!(requests[0].max_tokens, 250);

        let follow_ups = session.follow_ups();
        assert_eq!(follow_ups.len(), 1);
        assert_eq!(follow_ups[0].question, "what about beta?");
        assert_eq!(follow_ups[0].answer, "beta is manageable");
    }

    #[tokio::test]
    async fn over_cap_input_reaches_the_model_truncated() {
        let service = PortfolioService::new();
        let llm = RecordingLlm::new("short answer");
        let mut session = AnalysisSession::new();
        session.set_portfolio_analysis("y".repeat(9_000));

        service
            .follow_up(&mut session, &llm, "what about beta?")
            .await
            .unwrap();

        let prompt = &llm.requests()[0].prompt;
        assert!(prompt.starts_with("..."));
        assert_eq!(
            prompt.chars().count(),
            finsight_core::prompt::FOLLOW_UP_INPUT_CAP + 3
        );
        assert!(prompt.ends_with("Follow-up Question: what about beta?"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// NewsService
// ═══════════════════════════════════════════════════════════════════

mod news_service {
    use super::*;

    #[tokio::test]
    async fn empty_articles_surface_as_empty_result() {
        let service = NewsService::new();
        let news = MockNews::with_titles(&[]);

        let err = service
            .fetch_articles(&news, "ZZZZ", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyResult(_)));
        assert_eq!(err.to_string(), "No articles found.");
    }

    #[tokio::test]
    async fn provider_errors_propagate_unchanged() {
        let service = NewsService::new();
        let err = service
            .fetch_articles(&FailingNews, "AAPL", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }

    #[tokio::test]
    async fn predictions_follow_the_model_labels() {
        let service = NewsService::new();
        let news = MockNews::with_titles(&[
            "Apple beats expectations",
            "Lawsuit filed against Apple",
            "Apple to hold developer event",
            "Analysts unsure about Apple",
        ]);
        let llm = RecordingLlm::with_replies(&["Positive", "negative", " Neutral. ", "bullish"]);

        let articles = service.fetch_articles(&news, "AAPL", 10).await.unwrap();
        let predictions = service.predict_sentiments(&llm, &articles).await.unwrap();

        assert_eq!(predictions.len(), 4);
        assert_eq!(predictions[0].sentiment, Sentiment::Positive);
        assert_eq!(predictions[1].sentiment, Sentiment::Negative);
        assert_eq!(predictions[2].sentiment, Sentiment::Neutral);
        // Unrecognized label counts as Neutral rather than failing the batch
        assert_eq!(predictions[3].sentiment, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn report_breakdown_matches_label_counts() {
        let service = NewsService::new();
        let news = MockNews::with_titles(&["a", "b", "c", "d", "e"]);
        let llm =
            RecordingLlm::with_replies(&["Positive", "Positive", "Negative", "Neutral", "Positive"]);

        let report = service
            .sentiment_report(&news, &llm, "aapl", 10)
            .await
            .unwrap();

        assert_eq!(report.ticker, "AAPL");
        assert_eq!(report.breakdown.positive, 3);
        assert_eq!(report.breakdown.neutral, 1);
        assert_eq!(report.breakdown.negative, 1);
        assert_eq!(report.breakdown.total(), report.predictions.len());
    }

    #[tokio::test]
    async fn limit_caps_the_number_of_classified_headlines() {
        let service = NewsService::new();
        let news = MockNews::with_titles(&["a", "b", "c", "d", "e"]);
        let llm = RecordingLlm::new("Neutral");

        let report = service
            .sentiment_report(&news, &llm, "AAPL", 2)
            .await
            .unwrap();
        assert_eq!(report.predictions.len(), 2);
        assert_eq!(llm.requests().len(), 2);
    }

    #[tokio::test]
    async fn classification_requests_embed_the_headline() {
        let service = NewsService::new();
        let news = MockNews::with_titles(&["Apple beats expectations"]);
        let llm = RecordingLlm::new("Positive");

        service
            .sentiment_report(&news, &llm, "AAPL", 10)
            .await
            .unwrap();

        let requests = llm.requests();
        assert!(requests[0]
            .prompt
            .contains("Headline: Apple beats expectations"));
        assert_eq!(requests[0].max_tokens, 5);
    }
}
