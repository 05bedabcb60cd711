use crate::errors::CoreError;
use crate::llm::{CompletionRequest, LlmClient};
use crate::models::statement::{FinancialStatement, StatementAnalysis, StatementKind};
use crate::prompt;
use crate::providers::traits::FinancialsProvider;

/// Fetches statement tables and turns them into narrative analyses.
///
/// Orchestration only — the table reshape lives on the model, the
/// templates in `prompt`, the transport in the providers.
pub struct StatementService;

impl StatementService {
    pub fn new() -> Self {
        Self
    }

    /// Fetch one statement table. `Combined` fetches all three and
    /// stacks them.
    pub async fn fetch_statement(
        &self,
        financials: &dyn FinancialsProvider,
        kind: StatementKind,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        match kind {
            StatementKind::BalanceSheet => financials.balance_sheet(ticker, years).await,
            StatementKind::IncomeStatement => financials.income_statement(ticker, years).await,
            StatementKind::CashFlow => financials.cash_flow(ticker, years).await,
            StatementKind::Combined => self.combined_statements(financials, ticker, years).await,
        }
    }

    /// Balance sheet + income statement + cash flow stacked into one
    /// table, with a separator row between consecutive statements.
    /// The three fetches run sequentially.
    pub async fn combined_statements(
        &self,
        financials: &dyn FinancialsProvider,
        ticker: &str,
        years: u32,
    ) -> Result<FinancialStatement, CoreError> {
        let balance_sheet = financials.balance_sheet(ticker, years).await?;
        let income_statement = financials.income_statement(ticker, years).await?;
        let cash_flow = financials.cash_flow(ticker, years).await?;

        Ok(FinancialStatement::combined(vec![
            balance_sheet,
            income_statement,
            cash_flow,
        ]))
    }

    /// Fetch a statement and produce its narrative analysis.
    pub async fn analyze_statement(
        &self,
        financials: &dyn FinancialsProvider,
        llm: &dyn LlmClient,
        kind: StatementKind,
        ticker: &str,
        years: u32,
    ) -> Result<StatementAnalysis, CoreError> {
        let statement = self.fetch_statement(financials, kind, ticker, years).await?;

        let prompt_text = match kind {
            StatementKind::BalanceSheet => prompt::balance_sheet_prompt(&statement),
            StatementKind::IncomeStatement => prompt::income_statement_prompt(&statement),
            StatementKind::CashFlow => prompt::cash_flow_prompt(&statement),
            StatementKind::Combined => prompt::full_picture_prompt(&statement),
        };

        let narrative = llm
            .complete(CompletionRequest::new(
                prompt_text,
                prompt::ANALYSIS_MAX_TOKENS,
            ))
            .await?;

        Ok(StatementAnalysis {
            statement,
            narrative,
        })
    }
}

impl Default for StatementService {
    fn default() -> Self {
        Self::new()
    }
}
