//! JSON export adapter implementing ExportPort.

use std::fs;
use std::path::Path;

use crate::domain::error::VizError;
use crate::ports::export_port::{ExportPort, RunExport};

#[derive(Debug, Default)]
pub struct JsonExportAdapter {
    pub pretty: bool,
}

impl JsonExportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render(&self, export: &RunExport<'_>) -> Result<String, VizError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(export)
        } else {
            serde_json::to_string(export)
        };
        rendered.map_err(|e| VizError::Io(std::io::Error::other(e)))
    }
}

impl ExportPort for JsonExportAdapter {
    fn export(&self, export: &RunExport<'_>, output_path: &Path) -> Result<(), VizError> {
        let json = self.render(export)?;
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, json)?;
        tracing::info!(path = %output_path.display(), "export written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::performance::format_performance_metrics;
    use crate::domain::performance::tests::sample;
    use crate::domain::processor::process_timeline;
    use crate::domain::timeline::RawTimelineRow;
    use tempfile::TempDir;

    fn equity(ts: &str, v: f64) -> RawTimelineRow {
        RawTimelineRow {
            timestamp: ts.into(),
            ticker: "EQUITY".into(),
            underlying: "PORTFOLIO".into(),
            close: Some(v),
            ..Default::default()
        }
    }

    #[test]
    fn writes_processed_run() {
        let data = process_timeline(
            &[equity("2024-01-01", 100.0), equity("2024-01-02", 80.0)],
            Vec::new(),
        )
        .unwrap();
        let metrics = format_performance_metrics(&sample()).unwrap();
        let export = RunExport {
            run_id: "run1",
            metrics: &metrics,
            data: &data,
            markers: &[],
        };

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("run1.json");
        JsonExportAdapter::new(true).export(&export, &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["run_id"], "run1");
        assert_eq!(written["metrics"]["total_trades"], 24);
        assert_eq!(written["data"]["equity"][1]["equity"], 80.0);
        assert_eq!(written["data"]["drawdown"][1]["drawdown"], -20.0);
        assert_eq!(written["data"]["metrics"]["EQUITY"].as_array().unwrap().len(), 2);
        assert!(written["markers"].as_array().unwrap().is_empty());
        assert_eq!(
            written["data"]["equity"][0]["timestamp"],
            "2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn compact_render_is_single_line() {
        let data = process_timeline(&[], Vec::new()).unwrap();
        let metrics = format_performance_metrics(&sample()).unwrap();
        let export = RunExport {
            run_id: "r",
            metrics: &metrics,
            data: &data,
            markers: &[],
        };
        let json = JsonExportAdapter::new(false).render(&export).unwrap();
        assert!(!json.contains('\n'));
    }
}
