//! Indicator overlays grouped by name.
//!
//! - `IndicatorPoint`: one `{timestamp, value}` sample
//! - `Indicator`: a named, ordered series of samples
//! - `IndicatorSet`: insertion-ordered mapping name → series

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::chart::{chart_unique, Timestamped};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Timestamped for IndicatorPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub name: String,
    pub data: Vec<IndicatorPoint>,
}

/// Indicators in the order their names were first seen. Points within a
/// name keep row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSet {
    series: Vec<Indicator>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, point: IndicatorPoint) {
        let idx = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.series.push(Indicator {
                    name: name.to_string(),
                    data: Vec::new(),
                });
                let i = self.series.len() - 1;
                self.index.insert(name.to_string(), i);
                i
            }
        };
        self.series[idx].data.push(point);
    }

    pub fn get(&self, name: &str) -> Option<&Indicator> {
        self.index.get(name).map(|&i| &self.series[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indicator> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of points across all indicators.
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.data.len()).sum()
    }

    /// Applies last-wins per-second dedup to every series. Only done when a
    /// caller asks for it.
    pub fn chart_unique(&self) -> IndicatorSet {
        let series: Vec<Indicator> = self
            .series
            .iter()
            .map(|s| Indicator {
                name: s.name.clone(),
                data: chart_unique(&s.data),
            })
            .collect();
        let index = self.index.clone();
        IndicatorSet { series, index }
    }
}
