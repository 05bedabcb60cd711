use serde::{Deserialize, Serialize};

/// Named financial ratios for one ticker, in a stable display order.
///
/// Values are `Option<f64>` because providers routinely omit metrics for
/// small caps, foreign listings, or loss-making companies. Missing values
/// render as "N/A" in prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatioSet {
    pub ticker: String,
    values: Vec<(String, Option<f64>)>,
}

impl RatioSet {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            values: Vec::new(),
        }
    }

    /// Append a ratio, preserving insertion order.
    pub fn push(&mut self, name: impl Into<String>, value: Option<f64>) {
        self.values.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A ticker's ratios side by side with the average across its peers.
///
/// The peer-average set carries the same ratio names in the same order
/// as the ticker's own set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioComparison {
    pub ticker: String,
    pub own: RatioSet,
    pub peer_average: RatioSet,
}

impl RatioComparison {
    /// Rows of the comparison table: (ratio name, own value, peer average).
    pub fn rows(&self) -> Vec<(&str, Option<f64>, Option<f64>)> {
        self.own
            .iter()
            .map(|(name, value)| (name, value, self.peer_average.get(name)))
            .collect()
    }
}

/// A ratio comparison together with the model's narrative analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioAnalysis {
    pub comparison: RatioComparison,
    pub narrative: String,
}
