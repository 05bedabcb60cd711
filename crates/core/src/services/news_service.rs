use crate::errors::CoreError;
use crate::llm::{CompletionRequest, LlmClient};
use crate::models::news::{
    NewsArticle, Sentiment, SentimentBreakdown, SentimentPrediction, SentimentReport,
};
use crate::prompt;
use crate::providers::traits::NewsProvider;

/// Fetches headlines and classifies each one's sentiment via the LLM.
pub struct NewsService;

impl NewsService {
    pub fn new() -> Self {
        Self
    }

    /// Fetch recent articles. A ticker with no coverage is an empty
    /// result, surfaced as an error the caller displays.
    pub async fn fetch_articles(
        &self,
        news: &dyn NewsProvider,
        ticker: &str,
        limit: u32,
    ) -> Result<Vec<NewsArticle>, CoreError> {
        let articles = news.articles(ticker, limit).await?;
        if articles.is_empty() {
            return Err(CoreError::EmptyResult("No articles found.".into()));
        }
        Ok(articles)
    }

    /// Classify each headline, one request at a time. A reply that
    /// matches none of the three labels counts as Neutral.
    pub async fn predict_sentiments(
        &self,
        llm: &dyn LlmClient,
        articles: &[NewsArticle],
    ) -> Result<Vec<SentimentPrediction>, CoreError> {
        let mut predictions = Vec::with_capacity(articles.len());
        for article in articles {
            let reply = llm
                .complete(CompletionRequest::new(
                    prompt::sentiment_prompt(&article.title),
                    prompt::SENTIMENT_MAX_TOKENS,
                ))
                .await?;

            let sentiment = reply.parse::<Sentiment>().unwrap_or_else(|err| {
                tracing::warn!(headline = %article.title, error = %err, "unrecognized sentiment label");
                Sentiment::Neutral
            });

            predictions.push(SentimentPrediction {
                headline: article.title.clone(),
                sentiment,
            });
        }
        Ok(predictions)
    }

    /// Fetch, classify, and aggregate: the full news sentiment flow for
    /// one ticker.
    pub async fn sentiment_report(
        &self,
        news: &dyn NewsProvider,
        llm: &dyn LlmClient,
        ticker: &str,
        limit: u32,
    ) -> Result<SentimentReport, CoreError> {
        let articles = self.fetch_articles(news, ticker, limit).await?;
        let predictions = self.predict_sentiments(llm, &articles).await?;
        let breakdown = SentimentBreakdown::from_predictions(&predictions);

        Ok(SentimentReport {
            ticker: ticker.to_uppercase(),
            predictions,
            breakdown,
        })
    }
}

impl Default for NewsService {
    fn default() -> Self {
        Self::new()
    }
}
