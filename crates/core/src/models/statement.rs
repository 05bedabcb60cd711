use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;

/// Which financial statement a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
    /// Balance sheet, income statement, and cash flow stacked into one table.
    Combined,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementKind::BalanceSheet => write!(f, "Balance Sheet"),
            StatementKind::IncomeStatement => write!(f, "Income Statement"),
            StatementKind::CashFlow => write!(f, "Cash Flow Statement"),
            StatementKind::Combined => write!(f, "Combined Financial Statements"),
        }
    }
}

/// Identifier columns dropped from provider reports before transposing.
/// These carry filing metadata, not financial line items.
const DROPPED_FIELDS: &[&str] = &["cik", "link", "finalLink"];

/// Label of the separator row inserted between statements in a combined table.
pub const SEPARATOR_LABEL: &str = "------------------------------";

/// One row of a statement table: a line item name and one value per period.
///
/// Values stay as raw JSON values because statement reports mix numbers
/// with strings (reported currency, filing period labels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub values: Vec<Value>,
}

/// A time-indexed financial statement table for one ticker.
///
/// Rows are line items, columns are reporting periods sorted ascending.
/// Every row holds exactly `periods.len()` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub kind: StatementKind,
    pub ticker: String,
    pub periods: Vec<NaiveDate>,
    pub line_items: Vec<LineItem>,
}

impl FinancialStatement {
    /// Empty placeholder for tickers the provider has no data for.
    pub fn empty(kind: StatementKind, ticker: impl Into<String>) -> Self {
        Self {
            kind,
            ticker: ticker.into(),
            periods: Vec::new(),
            line_items: Vec::new(),
        }
    }

    /// Build a statement table from raw provider reports (one JSON object
    /// per period, newest first as the API returns them).
    ///
    /// Drops identifier columns, sorts the reports by date ascending, and
    /// transposes so dates become columns and line items become rows.
    pub fn from_reports(
        kind: StatementKind,
        ticker: impl Into<String>,
        reports: Vec<Map<String, Value>>,
    ) -> Result<Self, CoreError> {
        let ticker = ticker.into();
        if reports.is_empty() {
            return Ok(Self::empty(kind, ticker));
        }

        let mut dated: Vec<(NaiveDate, Map<String, Value>)> = Vec::with_capacity(reports.len());
        for report in reports {
            let date_str = report
                .get("date")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    CoreError::Validation(format!("{kind} report for {ticker} has no 'date' field"))
                })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                CoreError::Validation(format!(
                    "{kind} report for {ticker} has invalid date '{date_str}': {e}"
                ))
            })?;
            dated.push((date, report));
        }
        dated.sort_by_key(|(date, _)| *date);

        let periods: Vec<NaiveDate> = dated.iter().map(|(date, _)| *date).collect();

        // Row order: fields of the earliest report, then any field that only
        // appears in later reports. Guarantees one row per returned line item.
        let mut names: Vec<String> = Vec::new();
        for (_, report) in &dated {
            for name in report.keys() {
                if name == "date" || DROPPED_FIELDS.contains(&name.as_str()) {
                    continue;
                }
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
        }

        let line_items = names
            .into_iter()
            .map(|name| {
                let values = dated
                    .iter()
                    .map(|(_, report)| report.get(&name).cloned().unwrap_or(Value::Null))
                    .collect();
                LineItem { name, values }
            })
            .collect();

        Ok(Self {
            kind,
            ticker,
            periods,
            line_items,
        })
    }

    /// Stack several statements into one table with a separator row
    /// between consecutive sections. Column headers come from the first
    /// section.
    pub fn combined(sections: Vec<FinancialStatement>) -> FinancialStatement {
        let ticker = sections
            .first()
            .map(|s| s.ticker.clone())
            .unwrap_or_default();
        let periods = sections
            .first()
            .map(|s| s.periods.clone())
            .unwrap_or_default();

        let separator = LineItem {
            name: SEPARATOR_LABEL.to_string(),
            values: vec![Value::String(String::new()); periods.len()],
        };

        let mut line_items = Vec::new();
        for (idx, section) in sections.into_iter().enumerate() {
            if idx > 0 {
                line_items.push(separator.clone());
            }
            line_items.extend(section.line_items);
        }

        FinancialStatement {
            kind: StatementKind::Combined,
            ticker,
            periods,
            line_items,
        }
    }

    pub fn row_count(&self) -> usize {
        self.line_items.len()
    }

    pub fn column_count(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Render the table as prompt text: a header row of periods, then one
    /// line per line item with values separated by " | ".
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let header: Vec<String> = self.periods.iter().map(|d| d.to_string()).collect();
        out.push_str("date: ");
        out.push_str(&header.join(" | "));
        out.push('\n');

        for item in &self.line_items {
            let values: Vec<String> = item.values.iter().map(render_value).collect();
            out.push_str(&item.name);
            out.push_str(": ");
            out.push_str(&values.join(" | "));
            out.push('\n');
        }
        out
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A fetched statement table together with the model's narrative analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementAnalysis {
    pub statement: FinancialStatement,
    pub narrative: String,
}
