//! Domain error types.

/// Top-level error type for qtviz.
#[derive(Debug, thiserror::Error)]
pub enum VizError {
    #[error("malformed row {row}: field `{field}`: {reason}")]
    MalformedRow {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("ambiguous classification for row {row} (ticker {ticker}): matched {facets}")]
    AmbiguousClassification {
        row: usize,
        ticker: String,
        facets: String,
    },

    #[error("invalid numeric value for {field}: {value:?}")]
    MetricParse { field: String, value: String },

    #[error("run not found: {path}")]
    RunNotFound { path: String },

    #[error("failed to load {file}: {reason}")]
    RunLoad { file: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VizError {
    pub(crate) fn malformed(row: usize, field: &str, reason: impl Into<String>) -> Self {
        VizError::MalformedRow {
            row,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn metric(field: &str, value: &str) -> Self {
        VizError::MetricParse {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

impl From<&VizError> for std::process::ExitCode {
    fn from(err: &VizError) -> Self {
        let code: u8 = match err {
            VizError::Io(_) => 1,
            VizError::ConfigParse { .. }
            | VizError::ConfigMissing { .. }
            | VizError::ConfigInvalid { .. } => 2,
            VizError::RunNotFound { .. } | VizError::RunLoad { .. } => 3,
            VizError::MalformedRow { .. } | VizError::AmbiguousClassification { .. } => 4,
            VizError::MetricParse { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
