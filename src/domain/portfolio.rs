//! Portfolio-level metric streams carried in the timeline under reserved
//! ticker names.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::chart::Timestamped;

pub const EQUITY: &str = "EQUITY";

/// Tickers that denote portfolio-level scalars rather than instruments.
/// Matched exactly.
pub const RESERVED_METRIC_NAMES: [&str; 10] = [
    EQUITY,
    "CASH",
    "POSITIONS_VALUE",
    "SHARPE",
    "SORTINO",
    "CURRENT_DRAWDOWN",
    "CAGR",
    "CALMAR",
    "EXPECTANCY",
    "PROFIT_FACTOR",
];

pub fn is_reserved_metric(ticker: &str) -> bool {
    RESERVED_METRIC_NAMES.contains(&ticker)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

impl Timestamped for EquityPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Timestamped for MetricPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Accumulates reserved-metric rows by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PortfolioMetrics {
    series: BTreeMap<String, Vec<MetricPoint>>,
}

impl PortfolioMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows whose ticker is not reserved are ignored.
    pub fn record(&mut self, name: &str, timestamp: DateTime<Utc>, value: f64) {
        if !is_reserved_metric(name) {
            return;
        }
        self.series
            .entry(name.to_string())
            .or_default()
            .push(MetricPoint { timestamp, value });
    }

    pub fn get(&self, name: &str) -> Option<&[MetricPoint]> {
        self.series.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
