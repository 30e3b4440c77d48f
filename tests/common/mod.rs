#![allow(dead_code)]

use qtviz::domain::error::VizError;
use qtviz::domain::performance::Performance;
use qtviz::domain::run::{Metadata, RunInfo, RunManifest};
pub use qtviz::domain::timeline::RawTimelineRow;
use qtviz::ports::run_port::RunPort;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_JSON: &str = r#"{
    "experiment_id": "sma_crossover",
    "run_id": "20251224_162255",
    "started_at": "2025-12-24T16:22:55",
    "finished_at": "2025-12-24T16:23:10",
    "status": "success",
    "config_sha256": "abc",
    "git": {"commit": "deadbeef", "branch": "main", "dirty": false},
    "environment": {"python_version": "3.12", "qtrader_version": "0.4.1"},
    "metrics": {"bars_processed": 252, "duration_seconds": 14.7}
}"#;

pub const METADATA_JSON: &str = r#"{
    "metadata_version": "1.0",
    "generated_at": "2025-12-24T16:23:10",
    "backtest": {
        "backtest_id": "bt-1",
        "start_date": "2020-01-01",
        "end_date": "2020-12-31",
        "initial_equity": "100000",
        "strategies": [{"strategy_id": "sma", "universe": ["AAPL"]}]
    }
}"#;

pub const PERFORMANCE_JSON: &str = r#"{
    "backtest_id": "bt-1",
    "start_date": "2020-01-01",
    "end_date": "2020-12-31",
    "duration_days": 365,
    "initial_equity": "100000",
    "final_equity": "110000",
    "total_return_pct": "10.0",
    "cagr": "9.98",
    "volatility_annual_pct": "14.0",
    "max_drawdown_pct": "20.0",
    "max_drawdown_duration_days": 2,
    "sharpe_ratio": "0.8",
    "sortino_ratio": "1.1",
    "calmar_ratio": "0.5",
    "total_trades": 2,
    "winning_trades": 1,
    "losing_trades": 1,
    "win_rate": "50.0",
    "profit_factor": "1.5",
    "avg_win": "300",
    "avg_loss": "-200",
    "largest_win": "300",
    "largest_loss": "-200",
    "expectancy": "50",
    "max_consecutive_wins": 1,
    "max_consecutive_losses": 1,
    "avg_trade_duration_days": "3.0",
    "monthly_returns": [
        {"period": "2020-01", "period_type": "monthly", "start_date": "2020-01-01",
         "end_date": "2020-01-31", "start_equity": "100000", "end_equity": "110000",
         "return_pct": "10.0", "num_trades": 1, "winning_trades": 1, "losing_trades": 0},
        {"period": "2020-02", "period_type": "monthly", "start_date": "2020-02-01",
         "end_date": "2020-02-29", "start_equity": "110000", "end_equity": "99000",
         "return_pct": "-10.0", "num_trades": 1, "winning_trades": 0, "losing_trades": 1}
    ],
    "trades": [
        {"trade_id": "t-1", "strategy_id": "sma", "symbol": "AAPL", "side": "long",
         "entry_price": "10.0", "exit_price": "13.0",
         "quantity": "100", "realized_pnl": "300", "realized_pnl_pct": "30.0",
         "entry_timestamp": "2020-01-02T00:00:00Z", "exit_timestamp": "2020-01-05T00:00:00Z",
         "duration_days": 3}
    ]
}"#;

/// A timeline of bars, one indicator, signals and portfolio rows.
pub const TIMELINE_JSON: &str = r#"[
    {"timestamp": "2020-01-02T00:00:00Z", "ticker": "AAPL", "underlying": "AAPL",
     "open": 10, "high": 11, "low": 9, "close": 10, "volume": 1000,
     "signal_intention": "OPEN_LONG", "signal_price": 10, "signal_reason": "cross"},
    {"timestamp": "2020-01-02T00:00:00Z", "ticker": "SMA(2)", "underlying": "AAPL", "close": 10},
    {"timestamp": "2020-01-02T00:00:00Z", "ticker": "EQUITY", "underlying": "PORTFOLIO", "close": 100000},
    {"timestamp": "2020-01-03T00:00:00Z", "ticker": "AAPL", "underlying": "AAPL",
     "open": 10, "high": 12, "low": 10, "close": 12, "volume": 1200,
     "signal_intention": "OPEN_LONG", "signal_price": 12},
    {"timestamp": "2020-01-03T00:00:00Z", "ticker": "SMA(2)", "underlying": "AAPL", "close": 11},
    {"timestamp": "2020-01-03T00:00:00Z", "ticker": "EQUITY", "underlying": "PORTFOLIO", "close": 80000},
    {"timestamp": "2020-01-04T00:00:00Z", "ticker": "AAPL", "underlying": "AAPL",
     "open": 12, "high": 13, "low": 11, "close": 13, "volume": 900,
     "signal_intention": "CLOSE_LONG", "signal_price": 13},
    {"timestamp": "2020-01-04T00:00:00Z", "ticker": "EQUITY", "underlying": "PORTFOLIO", "close": 110000},
    {"timestamp": "2020-01-04T00:00:00Z", "ticker": "AAPL", "underlying": "AAPL", "fill_id": "f-1"}
]"#;

pub struct MockRunPort {
    pub manifest: Option<RunManifest>,
    pub metadata: Option<Metadata>,
    pub performance: Option<Performance>,
    pub timeline: Vec<RawTimelineRow>,
    pub runs: Vec<RunInfo>,
}

impl MockRunPort {
    pub fn new() -> Self {
        Self {
            manifest: serde_json::from_str(MANIFEST_JSON).ok(),
            metadata: serde_json::from_str(METADATA_JSON).ok(),
            performance: serde_json::from_str(PERFORMANCE_JSON).ok(),
            timeline: Vec::new(),
            runs: Vec::new(),
        }
    }

    pub fn with_timeline(mut self, rows: Vec<RawTimelineRow>) -> Self {
        self.timeline = rows;
        self
    }

    pub fn without_performance(mut self) -> Self {
        self.performance = None;
        self
    }

    fn missing(run_id: &str, file: &str) -> VizError {
        VizError::RunLoad {
            file: format!("{run_id}/{file}"),
            reason: "not provided".into(),
        }
    }
}

impl RunPort for MockRunPort {
    fn load_manifest(&self, run_id: &str) -> Result<RunManifest, VizError> {
        self.manifest
            .clone()
            .ok_or_else(|| Self::missing(run_id, "manifest.json"))
    }

    fn load_metadata(&self, run_id: &str) -> Result<Metadata, VizError> {
        self.metadata
            .clone()
            .ok_or_else(|| Self::missing(run_id, "metadata.json"))
    }

    fn load_performance(&self, run_id: &str) -> Result<Performance, VizError> {
        self.performance
            .clone()
            .ok_or_else(|| Self::missing(run_id, "performance.json"))
    }

    fn load_timeline(&self, _run_id: &str) -> Result<Vec<RawTimelineRow>, VizError> {
        Ok(self.timeline.clone())
    }

    fn list_runs(&self) -> Result<Vec<RunInfo>, VizError> {
        Ok(self.runs.clone())
    }
}

/// Write a complete run directory under `base` and return its path.
pub fn write_run_dir(base: &Path, run_id: &str, timeline: &str) -> PathBuf {
    let run = base.join(run_id);
    fs::create_dir_all(run.join("timeseries")).unwrap();
    fs::write(run.join("manifest.json"), MANIFEST_JSON).unwrap();
    fs::write(run.join("metadata.json"), METADATA_JSON).unwrap();
    fs::write(run.join("performance.json"), PERFORMANCE_JSON).unwrap();
    fs::write(run.join("timeseries").join("chart_data.json"), timeline).unwrap();
    run
}

pub fn row(ts: &str, ticker: &str, underlying: &str) -> RawTimelineRow {
    RawTimelineRow {
        timestamp: ts.into(),
        ticker: ticker.into(),
        underlying: underlying.into(),
        ..Default::default()
    }
}

pub fn bar(ts: &str, ticker: &str, close: f64) -> RawTimelineRow {
    RawTimelineRow {
        open: Some(close),
        high: Some(close + 1.0),
        low: Some(close - 1.0),
        close: Some(close),
        volume: Some(1000.0),
        ..row(ts, ticker, ticker)
    }
}

pub fn signal(mut r: RawTimelineRow, intention: &str) -> RawTimelineRow {
    r.signal_intention = Some(intention.into());
    r.signal_price = r.close;
    r
}

pub fn indicator(ts: &str, name: &str, value: f64) -> RawTimelineRow {
    RawTimelineRow {
        close: Some(value),
        ..row(ts, name, "AAPL")
    }
}

pub fn portfolio(ts: &str, name: &str, value: f64) -> RawTimelineRow {
    RawTimelineRow {
        close: Some(value),
        ..row(ts, name, "PORTFOLIO")
    }
}

/// Daily timestamp `day` days after 2024-01-01.
pub fn day(day: u32) -> String {
    (chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(day as u64))
        .format("%Y-%m-%d")
        .to_string()
}
