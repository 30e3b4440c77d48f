//! OHLCV bar representation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::chart::Timestamped;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Timestamped for OhlcvBar {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

