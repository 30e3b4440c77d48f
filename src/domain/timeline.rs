//! Raw per-bar timeline rows as written by the backtest engine.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the timeline feed. Every row is tagged by `ticker`, which may
/// name a security, a reserved portfolio metric, or a derived indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTimelineRow {
    pub timestamp: String,
    #[serde(default)]
    pub strategy_id: Option<String>,
    pub ticker: String,
    #[serde(default)]
    pub underlying: String,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub signal_intention: Option<String>,
    #[serde(default)]
    pub signal_price: Option<f64>,
    #[serde(default)]
    pub signal_confidence: Option<f64>,
    #[serde(default)]
    pub signal_reason: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub fill_id: Option<String>,
    #[serde(default)]
    pub trade_id: Option<String>,
}

impl RawTimelineRow {
    /// A signal intention is only meaningful when non-blank.
    pub fn signal_intention(&self) -> Option<&str> {
        self.signal_intention
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp. Offsets are normalised to UTC; timestamps
/// without an offset and bare dates are taken as UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        assert_eq!(
            parse_timestamp("2020-01-02T09:30:00+02:00"),
            Some(utc(2020, 1, 2, 7, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2020-01-02T09:30:00Z"),
            Some(utc(2020, 1, 2, 9, 30, 0))
        );
    }

    #[test]
    fn parses_space_separated_with_offset() {
        assert_eq!(
            parse_timestamp("2020-01-02 00:00:00+00:00"),
            Some(utc(2020, 1, 2, 0, 0, 0))
        );
    }

    #[test]
    fn parses_naive_as_utc() {
        assert_eq!(
            parse_timestamp("2020-01-02T16:00:00"),
            Some(utc(2020, 1, 2, 16, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2020-01-02 16:00:00.250"),
            Some(utc(2020, 1, 2, 16, 0, 0) + chrono::Duration::milliseconds(250))
        );
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        assert_eq!(parse_timestamp("2020-01-02"), Some(utc(2020, 1, 2, 0, 0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2020-13-45"), None);
    }

    #[test]
    fn blank_signal_intention_is_absent() {
        let row = RawTimelineRow {
            signal_intention: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(row.signal_intention(), None);
    }
}
