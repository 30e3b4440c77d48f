//! Run directory adapter.
//!
//! Layout of one run, relative to `<base>/<run_id>/`:
//!
//! ```text
//! manifest.json
//! metadata.json
//! performance.json
//! timeseries/chart_data.json   (or a CSV feed, see `with_timeline_file`)
//! ```

use csv::StringRecord;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::VizError;
use crate::domain::performance::Performance;
use crate::domain::run::{Metadata, RunInfo, RunManifest};
use crate::domain::timeline::RawTimelineRow;
use crate::ports::config_port::ConfigPort;
use crate::ports::run_port::RunPort;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const PERFORMANCE_FILE: &str = "performance.json";
pub const DEFAULT_TIMELINE_FILE: &str = "timeseries/chart_data.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineFormat {
    Csv,
    Json,
}

impl TimelineFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(TimelineFormat::Csv),
            "json" => Some(TimelineFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct RunDirAdapter {
    base_path: PathBuf,
    timeline_file: PathBuf,
}

impl RunDirAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            timeline_file: PathBuf::from(DEFAULT_TIMELINE_FILE),
        }
    }

    /// Timeline feed location relative to the run directory.
    pub fn with_timeline_file(mut self, relative: impl Into<PathBuf>) -> Self {
        self.timeline_file = relative.into();
        self
    }

    /// `[runs] dir` is required; `[timeline] file` is optional.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, VizError> {
        let dir = config.require_string("runs", "dir")?;
        let adapter = Self::new(PathBuf::from(dir));
        Ok(match config.get_string("timeline", "file") {
            Some(file) if !file.trim().is_empty() => adapter.with_timeline_file(file.trim()),
            _ => adapter,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn run_path(&self, run_id: &str) -> Result<PathBuf, VizError> {
        let path = self.base_path.join(run_id);
        if !path.is_dir() {
            return Err(VizError::RunNotFound {
                path: path.display().to_string(),
            });
        }
        Ok(path)
    }

    fn read_file(&self, run_id: &str, relative: &Path) -> Result<(PathBuf, String), VizError> {
        let path = self.run_path(run_id)?.join(relative);
        let content = fs::read_to_string(&path).map_err(|e| VizError::RunLoad {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok((path, content))
    }

    fn read_json<T: DeserializeOwned>(&self, run_id: &str, file: &str) -> Result<T, VizError> {
        let (path, content) = self.read_file(run_id, Path::new(file))?;
        tracing::debug!(path = %path.display(), "reading run artifact");
        serde_json::from_str(&content).map_err(|e| VizError::RunLoad {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl RunPort for RunDirAdapter {
    fn load_manifest(&self, run_id: &str) -> Result<RunManifest, VizError> {
        self.read_json(run_id, MANIFEST_FILE)
    }

    fn load_metadata(&self, run_id: &str) -> Result<Metadata, VizError> {
        self.read_json(run_id, METADATA_FILE)
    }

    fn load_performance(&self, run_id: &str) -> Result<Performance, VizError> {
        self.read_json(run_id, PERFORMANCE_FILE)
    }

    fn load_timeline(&self, run_id: &str) -> Result<Vec<RawTimelineRow>, VizError> {
        let format =
            TimelineFormat::from_path(&self.timeline_file).ok_or_else(|| VizError::RunLoad {
                file: self.timeline_file.display().to_string(),
                reason: "unsupported timeline format (expected .csv or .json)".into(),
            })?;
        let (path, content) = self.read_file(run_id, &self.timeline_file)?;
        let source = path.display().to_string();
        let rows = match format {
            TimelineFormat::Csv => parse_timeline_csv(content.as_bytes(), &source)?,
            TimelineFormat::Json => parse_timeline_json(&content, &source)?,
        };
        tracing::info!(rows = rows.len(), path = %source, "loaded timeline");
        Ok(rows)
    }

    fn list_runs(&self) -> Result<Vec<RunInfo>, VizError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| VizError::RunLoad {
            file: self.base_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !path.join(MANIFEST_FILE).is_file() {
                continue;
            }
            runs.push(RunInfo {
                id: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }

        runs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(runs)
    }
}

/// Parse a JSON array of timeline rows. `null` fields are absent.
pub fn parse_timeline_json(content: &str, source: &str) -> Result<Vec<RawTimelineRow>, VizError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).map_err(|e| VizError::RunLoad {
            file: source.to_string(),
            reason: e.to_string(),
        })?;
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value(value).map_err(|e| VizError::malformed(i, "row", e.to_string()))
        })
        .collect()
}

struct Columns {
    timestamp: usize,
    ticker: usize,
    strategy_id: Option<usize>,
    underlying: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
    signal_intention: Option<usize>,
    signal_price: Option<usize>,
    signal_confidence: Option<usize>,
    signal_reason: Option<usize>,
    order_id: Option<usize>,
    fill_id: Option<usize>,
    trade_id: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord, source: &str) -> Result<Self, VizError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| VizError::RunLoad {
                file: source.to_string(),
                reason: format!("missing column {name}"),
            })
        };
        Ok(Columns {
            timestamp: require("timestamp")?,
            ticker: require("ticker")?,
            strategy_id: find("strategy_id"),
            underlying: find("underlying"),
            open: find("open"),
            high: find("high"),
            low: find("low"),
            close: find("close"),
            volume: find("volume"),
            signal_intention: find("signal_intention"),
            signal_price: find("signal_price"),
            signal_confidence: find("signal_confidence"),
            signal_reason: find("signal_reason"),
            order_id: find("order_id"),
            fill_id: find("fill_id"),
            trade_id: find("trade_id"),
        })
    }

    fn row(&self, i: usize, record: &StringRecord) -> Result<RawTimelineRow, VizError> {
        let number = |idx: Option<usize>, field: &str| optional_number(i, record, idx, field);
        Ok(RawTimelineRow {
            timestamp: record.get(self.timestamp).unwrap_or_default().trim().to_string(),
            strategy_id: text(record, self.strategy_id),
            ticker: record.get(self.ticker).unwrap_or_default().trim().to_string(),
            underlying: text(record, self.underlying).unwrap_or_default(),
            open: number(self.open, "open")?,
            high: number(self.high, "high")?,
            low: number(self.low, "low")?,
            close: number(self.close, "close")?,
            volume: number(self.volume, "volume")?,
            signal_intention: text(record, self.signal_intention),
            signal_price: number(self.signal_price, "signal_price")?,
            signal_confidence: number(self.signal_confidence, "signal_confidence")?,
            signal_reason: text(record, self.signal_reason),
            order_id: text(record, self.order_id),
            fill_id: text(record, self.fill_id),
            trade_id: text(record, self.trade_id),
        })
    }
}

fn text(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Empty cell → `None`; anything that is not a finite number is malformed.
fn optional_number(
    row: usize,
    record: &StringRecord,
    idx: Option<usize>,
    field: &str,
) -> Result<Option<f64>, VizError> {
    let Some(raw) = idx.and_then(|i| record.get(i)).map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .map_err(|e| VizError::malformed(row, field, format!("{raw:?}: {e}")))?;
    if !value.is_finite() {
        return Err(VizError::malformed(row, field, format!("{raw:?} is not finite")));
    }
    Ok(Some(value))
}

/// Parse a header-driven CSV timeline. `timestamp` and `ticker` columns are
/// required; every other column is optional.
pub fn parse_timeline_csv<R: std::io::Read>(
    reader: R,
    source: &str,
) -> Result<Vec<RawTimelineRow>, VizError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(|e| VizError::RunLoad {
        file: source.to_string(),
        reason: format!("CSV header error: {e}"),
    })?;
    let columns = Columns::from_headers(headers, source)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| VizError::malformed(i, "record", e.to_string()))?;
        rows.push(columns.row(i, &record)?);
    }
    Ok(rows)
}
