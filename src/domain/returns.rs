//! Monthly returns grid for the returns heatmap.

use serde::Serialize;
use std::collections::BTreeMap;

use super::error::VizError;
use super::performance::{parse_decimal, PeriodReturn};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearReturns {
    pub year: i32,
    /// Decimal fraction per month (0.02 for 2%); `None` when not reported.
    pub months: [Option<f64>; 12],
    /// Compounded over the reported months, in percent.
    pub ytd_pct: f64,
}

fn parse_period(value: &str) -> Result<(i32, usize), VizError> {
    let bad = || VizError::metric("period", value);
    let (year, month) = value.trim().split_once('-').ok_or_else(bad)?;
    let year: i32 = year.parse().map_err(|_| bad())?;
    let month: usize = month.parse().map_err(|_| bad())?;
    if !(1..=12).contains(&month) {
        return Err(bad());
    }
    Ok((year, month))
}

/// Group `YYYY-MM` period returns by year, oldest first. A later entry for
/// the same month replaces an earlier one.
pub fn monthly_returns_grid(returns: &[PeriodReturn]) -> Result<Vec<YearReturns>, VizError> {
    let mut years: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
    for entry in returns {
        let (year, month) = parse_period(&entry.period)?;
        let pct = parse_decimal("return_pct", &entry.return_pct)?;
        years.entry(year).or_insert([None; 12])[month - 1] = Some(pct / 100.0);
    }

    Ok(years
        .into_iter()
        .map(|(year, months)| {
            let compounded = months.iter().flatten().fold(1.0, |acc, r| acc * (1.0 + r));
            YearReturns {
                year,
                months,
                ytd_pct: (compounded - 1.0) * 100.0,
            }
        })
        .collect())
}
