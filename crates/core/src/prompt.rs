//! Prompt formatting: pure functions that turn fetched tables and
//! mappings into bounded natural-language prompt text. No I/O here.

use crate::models::portfolio::PortfolioEntry;
use crate::models::ratios::RatioComparison;
use crate::models::statement::FinancialStatement;

/// Token budget for full narrative analyses.
pub const ANALYSIS_MAX_TOKENS: u32 = 1000;

/// Token budget for follow-up answers.
pub const FOLLOW_UP_MAX_TOKENS: u32 = 250;

/// Token budget for one-word sentiment classifications.
pub const SENTIMENT_MAX_TOKENS: u32 = 5;

/// Character cap on the combined follow-up input (previous analysis +
/// question). Inputs over the cap keep their suffix and gain a "..."
/// prefix.
pub const FOLLOW_UP_INPUT_CAP: usize = 8000;

pub fn balance_sheet_prompt(statement: &FinancialStatement) -> String {
    format!(
        "Please analyze the following balance sheet data for the last few years:\n\n{}\n\n\
         Provide insights on the assets, liabilities, and equity trends, and evaluate if the \
         investing risk has increased in 750 words or less.",
        statement.to_text()
    )
}

pub fn income_statement_prompt(statement: &FinancialStatement) -> String {
    format!(
        "Please analyze the following income statement data for the last few years:\n\n{}\n\n\
         Provide insights on the revenue, expenses, and net income trends, evaluate profit \
         margins and the operational efficiency of the company in 750 words or less.",
        statement.to_text()
    )
}

pub fn cash_flow_prompt(statement: &FinancialStatement) -> String {
    format!(
        "Please analyze the following cash flows statement data for the last few years:\n\n{}\n\n\
         Provide insights on the operating, investing, and financing cash flows. Highlight any \
         major changes or trends in cash positions and evaluate the company's ability to \
         generate positive cash flow in 750 words or less.",
        statement.to_text()
    )
}

pub fn full_picture_prompt(statement: &FinancialStatement) -> String {
    format!(
        "Analyzing a company's complete financial health based on its consolidated financial \
         statements. The data includes the Balance Sheet, Income Statement, and Cash Flow \
         Statement over a period of years. Here are the key figures:\n\n{}\n\n\
         Based on this data, provide a comprehensive analysis covering the following points:\n\
         1. Overall financial health and stability of the company.\n\
         2. Key strengths and weaknesses evident from the balance sheet.\n\
         3. Profitability analysis based on the income statement.\n\
         4. Cash flow adequacy and liquidity position.\n\
         5. Trends over the years and any significant changes or anomalies.\n\
         6. Potential risks and investment opportunities.\n\
         7. Summary of the company's financial performance and future outlook.\n\n\
         Please present the analysis in a clear, structured, and detailed manner in 750 words \
         or less.",
        statement.to_text()
    )
}

pub fn ratio_comparison_prompt(comparison: &RatioComparison) -> String {
    let ticker = &comparison.ticker;
    let mut prompt = format!(
        "Analyze the financial metrics for the company with ticker symbol {ticker}:\n\n"
    );

    for (name, own, peer_average) in comparison.rows() {
        prompt.push_str(&format!(
            "- {name} for {ticker}: {}\n  Average {name} among peers: {}\n\n",
            render_metric(own),
            render_metric(peer_average),
        ));
    }

    prompt.push_str(
        "Considering the above data points and understanding the importance of these metrics \
         in evaluating a company's financial health and performance:\n\n\
         1. How does the company stand in terms of profitability, liquidity, and solvency \
         compared to its peers?\n\
         2. Are there any alarming disparities or noteworthy strengths in any specific \
         metrics?\n\
         3. What might these metrics indicate about the company's operational efficiency, \
         financial strategies, or market positioning?\n\
         4. Are there potential opportunities or risks that these metrics highlight?\n\n\
         Please provide a comprehensive analysis of the company's financial standing compared \
         to its peers.",
    );
    prompt
}

/// One line per stock (ticker, shares, price, market cap, sector, beta,
/// weight as a percentage) plus its ratio lines, then the analysis ask.
/// `weights` holds each entry's fraction of total market value.
pub fn portfolio_prompt(entries: &[PortfolioEntry], weights: &[f64]) -> String {
    let mut prompt = String::from(
        "Analyze the following stock portfolio, focusing on market position, financial \
         health, risk factors, weight of each stock in the portfolio, and financial \
         ratios:\n\n",
    );

    for (entry, weight) in entries.iter().zip(weights) {
        let ratio_lines: Vec<String> = entry
            .ratios
            .iter()
            .map(|(name, value)| format!("{name}: {}", render_metric(value)))
            .collect();

        prompt.push_str(&format!(
            "Stock: {} - Shares: {}, Price: {}, Market Cap: {}, Sector: {}, Beta: {}, \
             Weight in Portfolio: {:.2}%.\n\
             Financial Ratios:\n{}\n\n",
            entry.position.ticker,
            entry.position.shares,
            render_metric(entry.current_price),
            render_metric(entry.profile.market_cap),
            entry.profile.sector.as_deref().unwrap_or("N/A"),
            render_metric(entry.profile.beta),
            weight * 100.0,
            ratio_lines.join("\n"),
        ));
    }

    prompt.push_str(
        "Based on this data, provide a detailed analysis of each stock and the overall \
         portfolio, including diversification, performance, risk profile, and weight \
         distribution.",
    );
    prompt
}

/// Combine a follow-up question with the previous analysis, bounded by
/// `FOLLOW_UP_INPUT_CAP`.
pub fn follow_up_prompt(question: &str, previous_analysis: &str) -> String {
    let combined = format!(
        "Based on the following portfolio analysis, answer the user's follow-up \
         question:\n\n{previous_analysis}\n\nFollow-up Question: {question}"
    );
    truncate_to_cap(&combined, FOLLOW_UP_INPUT_CAP)
}

pub fn sentiment_prompt(headline: &str) -> String {
    format!(
        "Classify the sentiment of the following news headline as Positive, Neutral, or \
         Negative. Answer with exactly one of those words.\n\nHeadline: {headline}"
    )
}

/// Keep the last `cap` characters of over-long text, marking the cut
/// with a "..." prefix.
pub fn truncate_to_cap(text: &str, cap: usize) -> String {
    let count = text.chars().count();
    if count <= cap {
        return text.to_string();
    }
    let suffix: String = text.chars().skip(count - cap).collect();
    format!("...{suffix}")
}

fn render_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}
