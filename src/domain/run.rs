//! Run-level artifacts: manifest and metadata.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::performance::Performance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
    Running,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Running => "running",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitInfo {
    pub commit: String,
    pub branch: String,
    pub dirty: bool,
    #[serde(default)]
    pub diff_files_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    #[serde(default)]
    pub python_version: String,
    #[serde(default)]
    pub qtrader_version: String,
    #[serde(default)]
    pub packages: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub bars_processed: u64,
    pub duration_seconds: f64,
}

/// `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub experiment_id: String,
    pub run_id: String,
    pub started_at: String,
    #[serde(default)]
    pub finished_at: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub config_sha256: String,
    #[serde(default)]
    pub git: GitInfo,
    #[serde(default)]
    pub environment: EnvironmentInfo,
    #[serde(default)]
    pub metrics: RunMetrics,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceMeta {
    pub name: String,
    #[serde(default)]
    pub universe: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataMeta {
    #[serde(default)]
    pub sources: Vec<DataSourceMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMeta {
    pub strategy_id: String,
    #[serde(default)]
    pub universe: Vec<String>,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicyMeta {
    pub name: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingMeta {
    pub emit_metrics_events: bool,
    pub event_frequency: u32,
    pub risk_free_rate: f64,
    pub max_equity_points: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestMeta {
    pub backtest_id: String,
    pub start_date: String,
    pub end_date: String,
    pub initial_equity: String,
    #[serde(default)]
    pub replay_speed: f64,
    #[serde(default)]
    pub display_events: Vec<String>,
    #[serde(default)]
    pub data: DataMeta,
    #[serde(default)]
    pub strategies: Vec<StrategyMeta>,
    #[serde(default)]
    pub risk_policy: Option<RiskPolicyMeta>,
    #[serde(default)]
    pub strategy_adjustment_mode: Option<String>,
    #[serde(default)]
    pub portfolio_adjustment_mode: Option<String>,
    #[serde(default)]
    pub reporting: Option<ReportingMeta>,
}

/// `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub metadata_version: String,
    pub generated_at: String,
    pub backtest: BacktestMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRun {
    pub manifest: RunManifest,
    pub metadata: Metadata,
    pub performance: Performance,
}

/// A run directory discovered under the runs root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    pub id: String,
    pub path: std::path::PathBuf,
}

impl RunInfo {
    pub fn display_name(&self) -> String {
        display_name(&self.id)
    }
}

/// `20251224_162255` → `2025-12-24 16:22:55`; other ids are returned as is.
pub fn display_name(run_id: &str) -> String {
    NaiveDateTime::parse_from_str(run_id, "%Y%m%d_%H%M%S")
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| run_id.to_string())
}
