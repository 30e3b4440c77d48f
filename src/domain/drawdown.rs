//! Running-peak drawdown series and drawdown episodes.
//!
//! The running peak is the only sequential state; it is threaded through an
//! explicit fold so any sub-range can be continued from a known peak.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::chart::Timestamped;
use super::portfolio::EquityPoint;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPoint {
    pub timestamp: DateTime<Utc>,
    /// Percent below the running peak; never positive.
    pub drawdown: f64,
}

impl Timestamped for DrawdownPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One step of the fold: returns the updated peak and the drawdown at
/// `equity`. A non-positive peak yields 0.
pub fn drawdown_step(peak: f64, equity: f64) -> (f64, f64) {
    let peak = peak.max(equity);
    let drawdown = if peak > 0.0 {
        (equity - peak) / peak * 100.0
    } else {
        0.0
    };
    (peak, drawdown)
}

/// Drawdown over `equity` starting from `start_peak`. Returns the series and
/// the peak after the last point, which is the `start_peak` for the next
/// contiguous range.
pub fn drawdown_series_from(equity: &[EquityPoint], start_peak: f64) -> (Vec<DrawdownPoint>, f64) {
    equity.iter().fold(
        (Vec::with_capacity(equity.len()), start_peak),
        |(mut out, peak), point| {
            let (peak, drawdown) = drawdown_step(peak, point.equity);
            out.push(DrawdownPoint {
                timestamp: point.timestamp,
                drawdown,
            });
            (out, peak)
        },
    )
}

pub fn drawdown_series(equity: &[EquityPoint]) -> Vec<DrawdownPoint> {
    drawdown_series_from(equity, 0.0).0
}

/// Deepest drawdown in the series (most negative), or 0 when empty.
pub fn max_drawdown(series: &[DrawdownPoint]) -> f64 {
    series.iter().map(|p| p.drawdown).fold(0.0, f64::min)
}

/// A peak-to-trough-to-recovery episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPeriod {
    pub start: DateTime<Utc>,
    pub trough: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Depth below the peak in percent, as a positive number.
    pub depth_pct: f64,
    pub peak_equity: f64,
    pub trough_equity: f64,
    pub duration_days: i64,
    pub recovery_days: Option<i64>,
}

impl DrawdownPeriod {
    pub fn recovered(&self) -> bool {
        self.end.is_some()
    }
}

struct OpenPeriod {
    start: DateTime<Utc>,
    peak_equity: f64,
    trough: DateTime<Utc>,
    trough_equity: f64,
}

impl OpenPeriod {
    fn close(self, end: Option<DateTime<Utc>>, last_seen: DateTime<Utc>) -> DrawdownPeriod {
        let until = end.unwrap_or(last_seen);
        DrawdownPeriod {
            start: self.start,
            trough: self.trough,
            end,
            depth_pct: (self.peak_equity - self.trough_equity) / self.peak_equity * 100.0,
            peak_equity: self.peak_equity,
            trough_equity: self.trough_equity,
            duration_days: (until - self.start).num_days(),
            recovery_days: end.map(|e| (e - self.trough).num_days()),
        }
    }
}

/// Split the equity curve into drawdown episodes. An episode opens at the
/// last peak when equity first falls below it and closes when equity gets
/// back to the peak; a trailing episode stays open (`end == None`).
pub fn drawdown_periods(equity: &[EquityPoint]) -> Vec<DrawdownPeriod> {
    let mut periods = Vec::new();
    let mut peak = 0.0_f64;
    let mut peak_ts: Option<DateTime<Utc>> = None;
    let mut open: Option<OpenPeriod> = None;

    for point in equity {
        if point.equity >= peak {
            if let Some(period) = open.take() {
                periods.push(period.close(Some(point.timestamp), point.timestamp));
            }
            peak = point.equity;
            peak_ts = Some(point.timestamp);
            continue;
        }
        if peak <= 0.0 {
            continue;
        }
        match open.as_mut() {
            Some(period) => {
                if point.equity < period.trough_equity {
                    period.trough_equity = point.equity;
                    period.trough = point.timestamp;
                }
            }
            None => {
                open = Some(OpenPeriod {
                    start: peak_ts.unwrap_or(point.timestamp),
                    peak_equity: peak,
                    trough: point.timestamp,
                    trough_equity: point.equity,
                });
            }
        }
    }

    if let (Some(period), Some(last)) = (open, equity.last()) {
        periods.push(period.close(None, last.timestamp));
    }
    periods
}

/// The `n` deepest recovered episodes, deepest first.
pub fn top_recovered(periods: &[DrawdownPeriod], n: usize) -> Vec<DrawdownPeriod> {
    let mut recovered: Vec<DrawdownPeriod> =
        periods.iter().filter(|p| p.recovered()).cloned().collect();
    recovered.sort_by(|a, b| b.depth_pct.total_cmp(&a.depth_pct));
    recovered.truncate(n);
    recovered
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                equity: v,
            })
            .collect()
    }

    fn values(series: &[DrawdownPoint]) -> Vec<f64> {
        series.iter().map(|p| p.drawdown).collect()
    }

    #[test]
    fn equity_100_90_95() {
        let dd = values(&drawdown_series(&curve(&[100.0, 90.0, 95.0])));
        assert_relative_eq!(dd[0], 0.0);
        assert_relative_eq!(dd[1], -10.0);
        assert_relative_eq!(dd[2], -5.0);
    }

    #[test]
    fn empty_curve_gives_empty_series() {
        assert!(drawdown_series(&[]).is_empty());
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn non_positive_peak_floors_at_zero() {
        let dd = values(&drawdown_series(&curve(&[0.0, -5.0, 0.0])));
        assert_eq!(dd, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_at_each_new_high() {
        let dd = values(&drawdown_series(&curve(&[100.0, 120.0, 110.0, 130.0])));
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!(dd[2] < 0.0);
        assert_eq!(dd[3], 0.0);
    }

    #[test]
    fn sub_range_continues_with_carried_peak() {
        let full = curve(&[100.0, 120.0, 90.0, 100.0, 130.0]);
        let whole = drawdown_series(&full);

        let (head, peak) = drawdown_series_from(&full[..2], 0.0);
        let (tail, _) = drawdown_series_from(&full[2..], peak);
        let joined: Vec<DrawdownPoint> = head.into_iter().chain(tail).collect();
        assert_eq!(joined, whole);

        // Restarting the tail from scratch loses the earlier peak.
        let (fresh, _) = drawdown_series_from(&full[2..], 0.0);
        assert_eq!(fresh[0].drawdown, 0.0);
        assert!(whole[2].drawdown < 0.0);
    }

    #[test]
    fn external_start_peak_applies_to_first_point() {
        let (series, peak) = drawdown_series_from(&curve(&[80.0]), 100.0);
        assert_relative_eq!(series[0].drawdown, -20.0);
        assert_eq!(peak, 100.0);
    }

    #[test]
    fn max_drawdown_is_most_negative() {
        let series = drawdown_series(&curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]));
        assert_relative_eq!(max_drawdown(&series), (80.0 - 110.0) / 110.0 * 100.0);
    }

    #[test]
    fn periods_split_on_recovery() {
        let eq = curve(&[100.0, 90.0, 80.0, 100.0, 120.0, 110.0, 125.0, 100.0]);
        let periods = drawdown_periods(&eq);
        assert_eq!(periods.len(), 3);

        let first = &periods[0];
        assert_eq!(first.start, eq[0].timestamp);
        assert_eq!(first.trough, eq[2].timestamp);
        assert_eq!(first.end, Some(eq[3].timestamp));
        assert_relative_eq!(first.depth_pct, 20.0);
        assert_eq!(first.duration_days, 3);
        assert_eq!(first.recovery_days, Some(1));

        let second = &periods[1];
        assert_eq!(second.start, eq[4].timestamp);
        assert_relative_eq!(second.peak_equity, 120.0);
        assert_relative_eq!(second.trough_equity, 110.0);

        let last = &periods[2];
        assert!(!last.recovered());
        assert_eq!(last.recovery_days, None);
        assert_eq!(last.duration_days, 1);
        assert_relative_eq!(last.depth_pct, 20.0);
    }

    #[test]
    fn monotonic_curve_has_no_periods() {
        assert!(drawdown_periods(&curve(&[1.0, 2.0, 3.0])).is_empty());
    }

    #[test]
    fn top_recovered_sorts_by_depth_and_skips_open() {
        let eq = curve(&[100.0, 95.0, 100.0, 70.0, 100.0, 90.0, 100.0, 50.0]);
        let periods = drawdown_periods(&eq);
        assert_eq!(periods.len(), 4);

        let top = top_recovered(&periods, 2);
        assert_eq!(top.len(), 2);
        assert_relative_eq!(top[0].depth_pct, 30.0);
        assert_relative_eq!(top[1].depth_pct, 10.0);
        assert!(top.iter().all(DrawdownPeriod::recovered));
    }
}
