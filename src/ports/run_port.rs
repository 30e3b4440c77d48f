//! Backtest run loading port trait.
//!
//! Given a run identifier, an implementation returns the parsed artifacts of
//! that run or fails with a descriptive error.

use crate::domain::error::VizError;
use crate::domain::performance::Performance;
use crate::domain::run::{BacktestRun, Metadata, RunInfo, RunManifest};
use crate::domain::timeline::RawTimelineRow;

pub trait RunPort {
    fn load_manifest(&self, run_id: &str) -> Result<RunManifest, VizError>;

    fn load_metadata(&self, run_id: &str) -> Result<Metadata, VizError>;

    fn load_performance(&self, run_id: &str) -> Result<Performance, VizError>;

    /// Timeline rows in file order.
    fn load_timeline(&self, run_id: &str) -> Result<Vec<RawTimelineRow>, VizError>;

    fn list_runs(&self) -> Result<Vec<RunInfo>, VizError>;

    fn load_run(&self, run_id: &str) -> Result<BacktestRun, VizError> {
        Ok(BacktestRun {
            manifest: self.load_manifest(run_id)?,
            metadata: self.load_metadata(run_id)?,
            performance: self.load_performance(run_id)?,
        })
    }
}
