//! Per-row classification of timeline rows.
//!
//! Classification is a set of independent predicate/extractor pairs applied
//! to the same row. A row can yield several facets (a price bar that also
//! carries a signal), but at most one of {bar, indicator, portfolio metric}.
//!
//! Schema: reserved metric names are matched exactly and a missing signal
//! confidence defaults to 1.0.

use chrono::{DateTime, Utc};

use super::error::VizError;
use super::indicator::IndicatorPoint;
use super::ohlcv::OhlcvBar;
use super::portfolio::{is_reserved_metric, EquityPoint, MetricPoint, EQUITY};
use super::signal::{Signal, SignalIntention, DEFAULT_CONFIDENCE};
use super::timeline::{parse_timestamp, RawTimelineRow};

/// `underlying` value binding a derived series to the whole portfolio.
pub const PORTFOLIO_SENTINEL: &str = "PORTFOLIO";

/// Ticker suffix marking a derived indicator series.
pub const INDICATOR_SUFFIX: &str = "_IND";

/// Everything extracted from one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFacets {
    pub bar: Option<OhlcvBar>,
    pub signal: Option<Signal>,
    pub equity: Option<EquityPoint>,
    pub indicator: Option<(String, IndicatorPoint)>,
    pub metric: Option<(String, MetricPoint)>,
}

/// Which exclusive category a row ended up in. Signals are additive and do
/// not affect the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Bar,
    Indicator,
    Metric,
    Dropped,
}

impl RowFacets {
    fn exclusive_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.bar.is_some() {
            names.push("ohlcv");
        }
        if self.indicator.is_some() {
            names.push("indicator");
        }
        if self.metric.is_some() {
            names.push("metric");
        }
        names
    }

    /// Rejects rows that landed in more than one exclusive category.
    pub fn check_exclusive(&self, row: usize, ticker: &str) -> Result<(), VizError> {
        let names = self.exclusive_names();
        if names.len() > 1 {
            return Err(VizError::AmbiguousClassification {
                row,
                ticker: ticker.to_string(),
                facets: names.join(", "),
            });
        }
        Ok(())
    }

    pub fn kind(&self) -> RowKind {
        if self.bar.is_some() {
            RowKind::Bar
        } else if self.indicator.is_some() {
            RowKind::Indicator
        } else if self.metric.is_some() {
            RowKind::Metric
        } else {
            RowKind::Dropped
        }
    }
}

/// Classify one row. `row` is the row's position in the input and is only
/// used for error reporting.
pub fn classify_row(row: usize, raw: &RawTimelineRow) -> Result<RowFacets, VizError> {
    let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| {
        VizError::malformed(
            row,
            "timestamp",
            format!("invalid ISO-8601 timestamp {:?}", raw.timestamp),
        )
    })?;

    let bar = extract_bar(raw, timestamp);
    let indicator = if bar.is_none() {
        extract_indicator(raw, timestamp)
    } else {
        None
    };
    let facets = RowFacets {
        signal: extract_signal(row, raw, timestamp)?,
        equity: extract_equity(raw, timestamp),
        metric: extract_metric(raw, timestamp),
        bar,
        indicator,
    };
    facets.check_exclusive(row, &raw.ticker)?;
    Ok(facets)
}

pub fn extract_bar(raw: &RawTimelineRow, timestamp: DateTime<Utc>) -> Option<OhlcvBar> {
    if is_reserved_metric(&raw.ticker) {
        return None;
    }
    Some(OhlcvBar {
        timestamp,
        open: raw.open?,
        high: raw.high?,
        low: raw.low?,
        close: raw.close?,
        volume: raw.volume.unwrap_or(0.0),
    })
}

pub fn extract_signal(
    row: usize,
    raw: &RawTimelineRow,
    timestamp: DateTime<Utc>,
) -> Result<Option<Signal>, VizError> {
    let (Some(intention), Some(price)) = (raw.signal_intention(), raw.signal_price) else {
        return Ok(None);
    };
    let intention: SignalIntention = intention
        .parse()
        .map_err(|e| VizError::malformed(row, "signal_intention", format!("{e}")))?;
    Ok(Some(Signal {
        timestamp,
        intention,
        price,
        confidence: raw.signal_confidence.unwrap_or(DEFAULT_CONFIDENCE),
        reason: raw.signal_reason.clone().filter(|r| !r.is_empty()),
    }))
}

pub fn extract_equity(raw: &RawTimelineRow, timestamp: DateTime<Utc>) -> Option<EquityPoint> {
    if raw.ticker != EQUITY {
        return None;
    }
    raw.close.map(|equity| EquityPoint { timestamp, equity })
}

pub fn extract_metric(
    raw: &RawTimelineRow,
    timestamp: DateTime<Utc>,
) -> Option<(String, MetricPoint)> {
    if !is_reserved_metric(&raw.ticker) {
        return None;
    }
    raw.close
        .map(|value| (raw.ticker.clone(), MetricPoint { timestamp, value }))
}

/// Callers must check the bar facet first; a genuine price bar is never an
/// indicator.
pub fn extract_indicator(
    raw: &RawTimelineRow,
    timestamp: DateTime<Utc>,
) -> Option<(String, IndicatorPoint)> {
    if is_reserved_metric(&raw.ticker) {
        return None;
    }
    let value = raw.close?;
    let derived = has_parameter_list(&raw.ticker)
        || raw.ticker.ends_with(INDICATOR_SUFFIX)
        || bound_to_other_security(raw);
    derived.then(|| (raw.ticker.clone(), IndicatorPoint { timestamp, value }))
}

/// `SMA(20)`, `BB(20,2)_upper`.
pub fn has_parameter_list(ticker: &str) -> bool {
    ticker
        .find('(')
        .is_some_and(|open| ticker[open + 1..].contains(')'))
}

pub fn is_portfolio_sentinel(underlying: &str) -> bool {
    let u = underlying.trim();
    u.is_empty() || u.eq_ignore_ascii_case(PORTFOLIO_SENTINEL)
}

fn bound_to_other_security(raw: &RawTimelineRow) -> bool {
    !is_portfolio_sentinel(&raw.underlying) && raw.underlying != raw.ticker
}
