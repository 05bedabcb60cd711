use crate::errors::CoreError;
use crate::models::settings::Settings;

use super::finnhub::FinnhubProvider;
use super::fmp::FmpProvider;
use super::polygon::PolygonProvider;
use super::traits::{FinancialsProvider, HistoryProvider, NewsProvider, RatioProvider};
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of the configured data providers.
///
/// Each slot covers one external API. A provider whose API key is absent
/// is simply not registered; operations that need it fail with
/// `CoreError::NoProvider` at call time instead of at construction.
pub struct ProviderRegistry {
    financials: Option<Box<dyn FinancialsProvider>>,
    ratios: Option<Box<dyn RatioProvider>>,
    history: Option<Box<dyn HistoryProvider>>,
    news: Option<Box<dyn NewsProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            financials: None,
            ratios: None,
            history: None,
            news: None,
        }
    }

    /// Create a registry with all default providers the settings allow.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();

        // FMP — statements + profiles, key is required by Settings
        registry.register_financials(Box::new(FmpProvider::new(settings.fmp_api_key.clone())));

        // Finnhub — ratios, requires API key
        if let Some(key) = &settings.finnhub_api_key {
            registry.register_ratios(Box::new(FinnhubProvider::new(key.clone())));
        }

        // Polygon — news, requires API key
        if let Some(key) = &settings.polygon_api_key {
            registry.register_news(Box::new(PolygonProvider::new(key.clone())));
        }

        // Yahoo Finance — price history, no API key needed
        if let Ok(yahoo) = YahooFinanceProvider::new() {
            registry.register_history(Box::new(yahoo));
        }

        registry
    }

    pub fn register_financials(&mut self, provider: Box<dyn FinancialsProvider>) {
        self.financials = Some(provider);
    }

    pub fn register_ratios(&mut self, provider: Box<dyn RatioProvider>) {
        self.ratios = Some(provider);
    }

    pub fn register_history(&mut self, provider: Box<dyn HistoryProvider>) {
        self.history = Some(provider);
    }

    pub fn register_news(&mut self, provider: Box<dyn NewsProvider>) {
        self.news = Some(provider);
    }

    pub fn financials(&self) -> Result<&dyn FinancialsProvider, CoreError> {
        self.financials
            .as_deref()
            .ok_or_else(|| CoreError::NoProvider("financial statements".into()))
    }

    pub fn ratios(&self) -> Result<&dyn RatioProvider, CoreError> {
        self.ratios
            .as_deref()
            .ok_or_else(|| CoreError::NoProvider("financial ratios".into()))
    }

    pub fn history(&self) -> Result<&dyn HistoryProvider, CoreError> {
        self.history
            .as_deref()
            .ok_or_else(|| CoreError::NoProvider("price history".into()))
    }

    pub fn news(&self) -> Result<&dyn NewsProvider, CoreError> {
        self.news
            .as_deref()
            .ok_or_else(|| CoreError::NoProvider("news".into()))
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
