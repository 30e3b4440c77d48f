//! Trading signals and consecutive-repeat deduplication.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::chart::Timestamped;

/// Confidence assigned when the feed omits `signal_confidence`.
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalIntention {
    Buy,
    Sell,
    OpenLong,
    CloseLong,
    OpenShort,
    CloseShort,
}

impl SignalIntention {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalIntention::Buy => "BUY",
            SignalIntention::Sell => "SELL",
            SignalIntention::OpenLong => "OPEN_LONG",
            SignalIntention::CloseLong => "CLOSE_LONG",
            SignalIntention::OpenShort => "OPEN_SHORT",
            SignalIntention::CloseShort => "CLOSE_SHORT",
        }
    }

    /// Long entries and short exits are drawn below the bar with an up arrow.
    pub fn is_bullish(&self) -> bool {
        matches!(
            self,
            SignalIntention::Buy | SignalIntention::OpenLong | SignalIntention::CloseShort
        )
    }

    /// Marker text: the first underscore becomes a space ("OPEN LONG").
    pub fn label(&self) -> String {
        self.as_str().replacen('_', " ", 1)
    }
}

impl fmt::Display for SignalIntention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal intention: {0}")]
pub struct UnknownIntention(pub String);

impl FromStr for SignalIntention {
    type Err = UnknownIntention;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BUY" => Ok(SignalIntention::Buy),
            "SELL" => Ok(SignalIntention::Sell),
            "OPEN_LONG" => Ok(SignalIntention::OpenLong),
            "CLOSE_LONG" => Ok(SignalIntention::CloseLong),
            "OPEN_SHORT" => Ok(SignalIntention::OpenShort),
            "CLOSE_SHORT" => Ok(SignalIntention::CloseShort),
            other => Err(UnknownIntention(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub intention: SignalIntention,
    pub price: f64,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Timestamped for Signal {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Collapse runs of identical intentions to their first occurrence.
///
/// Each signal is compared with the last *kept* signal, so any chain of
/// equal intentions yields exactly one output signal.
pub fn dedup_consecutive(signals: Vec<Signal>) -> Vec<Signal> {
    let mut kept: Vec<Signal> = Vec::with_capacity(signals.len());
    for signal in signals {
        if kept.last().is_some_and(|last| last.intention == signal.intention) {
            continue;
        }
        kept.push(signal);
    }
    kept
}
