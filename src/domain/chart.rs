//! Chart-uniqueness helpers shared by every display series.
//!
//! Charting collaborators key points by whole seconds. When two points fall
//! on the same second the **last** one wins, and the result is sorted
//! ascending by time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::signal::Signal;

pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Unix time floored to the second.
pub fn chart_time(ts: DateTime<Utc>) -> i64 {
    ts.timestamp()
}

/// Deduplicate on floored-to-second timestamp keeping the last occurrence,
/// then sort ascending.
pub fn chart_unique<T: Timestamped + Clone>(points: &[T]) -> Vec<T> {
    let mut by_second: BTreeMap<i64, &T> = BTreeMap::new();
    for point in points {
        by_second.insert(chart_time(point.timestamp()), point);
    }
    by_second.into_values().cloned().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPosition {
    BelowBar,
    AboveBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
}

/// A signal drawn on the price chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalMarker {
    pub time: i64,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub text: String,
}

impl From<&Signal> for SignalMarker {
    fn from(signal: &Signal) -> Self {
        let (position, shape) = if signal.intention.is_bullish() {
            (MarkerPosition::BelowBar, MarkerShape::ArrowUp)
        } else {
            (MarkerPosition::AboveBar, MarkerShape::ArrowDown)
        };
        SignalMarker {
            time: chart_time(signal.timestamp),
            position,
            shape,
            text: signal.intention.label(),
        }
    }
}

/// One marker per signal, ascending by time. Markers sharing a second are
/// all kept, in input order.
pub fn signal_markers(signals: &[Signal]) -> Vec<SignalMarker> {
    let mut markers: Vec<SignalMarker> = signals.iter().map(SignalMarker::from).collect();
    markers.sort_by_key(|m| m.time);
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{SignalIntention, DEFAULT_CONFIDENCE};
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct P(DateTime<Utc>, u32);

    impl Timestamped for P {
        fn timestamp(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn at(secs: i64, millis: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap() + chrono::Duration::milliseconds(millis)
    }

    #[test]
    fn last_occurrence_wins_within_same_second() {
        let points = vec![P(at(10, 0), 1), P(at(10, 500), 2), P(at(11, 0), 3)];
        let unique = chart_unique(&points);
        assert_eq!(unique, vec![P(at(10, 500), 2), P(at(11, 0), 3)]);
    }

    #[test]
    fn output_is_sorted_ascending() {
        let points = vec![P(at(30, 0), 1), P(at(10, 0), 2), P(at(20, 0), 3)];
        let secs: Vec<i64> = chart_unique(&points)
            .iter()
            .map(|p| chart_time(p.0))
            .collect();
        assert_eq!(secs, vec![10, 20, 30]);
    }

    #[test]
    fn empty_input() {
        let points: Vec<P> = Vec::new();
        assert!(chart_unique(&points).is_empty());
    }

    fn signal(secs: i64, intention: SignalIntention) -> Signal {
        Signal {
            timestamp: at(secs, 0),
            intention,
            price: 1.0,
            confidence: DEFAULT_CONFIDENCE,
            reason: None,
        }
    }

    #[test]
    fn markers_follow_intention_direction() {
        let markers = signal_markers(&[
            signal(20, SignalIntention::CloseLong),
            signal(10, SignalIntention::OpenLong),
            signal(20, SignalIntention::CloseShort),
        ]);
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].time, 10);
        assert_eq!(markers[0].position, MarkerPosition::BelowBar);
        assert_eq!(markers[0].shape, MarkerShape::ArrowUp);
        assert_eq!(markers[0].text, "OPEN LONG");
        assert_eq!(markers[1].shape, MarkerShape::ArrowDown);
        assert_eq!(markers[1].text, "CLOSE LONG");
        assert_eq!(markers[2].position, MarkerPosition::BelowBar);
    }
}
