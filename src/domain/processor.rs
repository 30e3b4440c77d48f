//! Timeline transformation pipeline.
//!
//! Rows stream once, in input order, through the classifier; every facet is
//! routed to its builder. Signals are deduplicated after the pass and the
//! drawdown series is computed last from the finished equity series.

use serde::Serialize;

use super::chart::chart_unique;
use super::classifier::{classify_row, RowKind};
use super::drawdown::{drawdown_series, DrawdownPoint};
use super::error::VizError;
use super::indicator::IndicatorSet;
use super::ohlcv::OhlcvBar;
use super::portfolio::{EquityPoint, PortfolioMetrics};
use super::signal::{dedup_consecutive, Signal};
use super::timeline::RawTimelineRow;
use super::trade::TradeRecord;

/// Row accounting for one classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationStats {
    pub rows: usize,
    pub bar_rows: usize,
    pub indicator_rows: usize,
    pub metric_rows: usize,
    pub dropped_rows: usize,
    pub raw_signals: usize,
}

impl ClassificationStats {
    fn count(&mut self, kind: RowKind) {
        self.rows += 1;
        match kind {
            RowKind::Bar => self.bar_rows += 1,
            RowKind::Indicator => self.indicator_rows += 1,
            RowKind::Metric => self.metric_rows += 1,
            RowKind::Dropped => self.dropped_rows += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessedBacktestData {
    /// Input order, not deduplicated. See [`ProcessedBacktestData::chart_ready`].
    pub ohlcv: Vec<OhlcvBar>,
    pub signals: Vec<Signal>,
    pub equity: Vec<EquityPoint>,
    pub indicators: IndicatorSet,
    pub metrics: PortfolioMetrics,
    pub drawdown: Vec<DrawdownPoint>,
    pub trades: Vec<TradeRecord>,
    pub stats: ClassificationStats,
}

impl ProcessedBacktestData {
    /// Copy with bars, equity, indicators and drawdown made unique per
    /// second (last wins) and sorted ascending. Signals are left alone.
    pub fn chart_ready(&self) -> ProcessedBacktestData {
        ProcessedBacktestData {
            ohlcv: chart_unique(&self.ohlcv),
            signals: self.signals.clone(),
            equity: chart_unique(&self.equity),
            indicators: self.indicators.chart_unique(),
            metrics: self.metrics.clone(),
            drawdown: chart_unique(&self.drawdown),
            trades: self.trades.clone(),
            stats: self.stats,
        }
    }
}

/// Classify and transform `rows`. The first malformed or ambiguous row
/// aborts the whole run. An empty input yields empty series.
pub fn process_timeline(
    rows: &[RawTimelineRow],
    trades: Vec<TradeRecord>,
) -> Result<ProcessedBacktestData, VizError> {
    let mut ohlcv = Vec::new();
    let mut raw_signals = Vec::new();
    let mut equity = Vec::new();
    let mut indicators = IndicatorSet::new();
    let mut metrics = PortfolioMetrics::new();
    let mut stats = ClassificationStats::default();

    for (i, row) in rows.iter().enumerate() {
        let facets = classify_row(i, row)?;
        stats.count(facets.kind());

        if let Some(bar) = facets.bar {
            ohlcv.push(bar);
        }
        if let Some(signal) = facets.signal {
            raw_signals.push(signal);
        }
        if let Some(point) = facets.equity {
            equity.push(point);
        }
        if let Some((name, point)) = facets.indicator {
            indicators.push(&name, point);
        }
        if let Some((name, point)) = facets.metric {
            metrics.record(&name, point.timestamp, point.value);
        }
    }

    stats.raw_signals = raw_signals.len();
    let signals = dedup_consecutive(raw_signals);
    let drawdown = drawdown_series(&equity);

    tracing::debug!(
        rows = stats.rows,
        bars = stats.bar_rows,
        indicators = indicators.len(),
        signals = signals.len(),
        equity_points = equity.len(),
        dropped = stats.dropped_rows,
        "timeline classified"
    );

    Ok(ProcessedBacktestData {
        ohlcv,
        signals,
        equity,
        indicators,
        metrics,
        drawdown,
        trades,
        stats,
    })
}
