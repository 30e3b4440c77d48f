//! Export port trait for processed runs.

use serde::Serialize;
use std::path::Path;

use crate::domain::chart::SignalMarker;
use crate::domain::error::VizError;
use crate::domain::performance::FormattedMetrics;
use crate::domain::processor::ProcessedBacktestData;

/// Everything written for one processed run.
#[derive(Debug, Serialize)]
pub struct RunExport<'a> {
    pub run_id: &'a str,
    pub metrics: &'a FormattedMetrics,
    pub data: &'a ProcessedBacktestData,
    pub markers: &'a [SignalMarker],
}

pub trait ExportPort {
    fn export(&self, export: &RunExport<'_>, output_path: &Path) -> Result<(), VizError>;
}
