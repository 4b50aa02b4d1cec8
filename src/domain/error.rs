//! Domain error types.
//!
//! [`PipelineError`] is scoped to one asset and is recoverable at the batch
//! boundary. [`SignalError`] aborts the strategy run that raised it.
//! [`StockcastError`] is the top-level error surfaced by the CLI.

use chrono::NaiveDate;

/// Per-asset failure while ingesting, transforming or windowing a series.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("{asset}: missing field {field}")]
    MissingField { asset: String, field: String },

    #[error("unsupported rescaling method: {method}")]
    UnsupportedMethod { method: String },

    #[error("{asset}: no valid rows to fit scaler on")]
    EmptyFitWindow { asset: String },

    #[error("{asset}: no rows left after lag/label alignment ({bars} bars, lag depth {lag_depth})")]
    InsufficientData {
        asset: String,
        bars: usize,
        lag_depth: usize,
    },

    #[error("{asset}: duplicate date {date}")]
    DuplicateDate { asset: String, date: NaiveDate },

    #[error("{asset}: log1p undefined for {field}={value} on {date}")]
    LogDomain {
        asset: String,
        field: String,
        date: NaiveDate,
        value: f64,
    },

    #[error("lag depth must be at least 1, got {0}")]
    InvalidLagDepth(usize),

    #[error("{asset}: {reason}")]
    Source { asset: String, reason: String },
}

impl PipelineError {
    pub fn missing_field(asset: &str, field: &str) -> Self {
        PipelineError::MissingField {
            asset: asset.to_string(),
            field: field.to_string(),
        }
    }

    pub fn source(asset: &str, reason: impl Into<String>) -> Self {
        PipelineError::Source {
            asset: asset.to_string(),
            reason: reason.into(),
        }
    }
}

/// Fatal failure during a strategy run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("indicator {indicator} is not available")]
    MissingIndicator { indicator: String },

    #[error("indicator {indicator} has {len} values, bar {bar_index} requested")]
    IndicatorTooShort {
        indicator: String,
        len: usize,
        bar_index: usize,
    },

    #[error("indicator {indicator} has no {field} component")]
    WrongIndicatorShape { indicator: String, field: String },

    #[error("indicator {indicator} needs {field} on {date}, which is missing")]
    MissingInput {
        indicator: String,
        field: String,
        date: NaiveDate,
    },
}

/// Top-level error type for stockcast.
#[derive(Debug, thiserror::Error)]
pub enum StockcastError {
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
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error("no asset survived the pipeline")]
    NoAssets,

    #[error("failed to write {path}: {reason}")]
    Output { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockcastError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        StockcastError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        StockcastError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// Process exit status for this error category.
    pub fn status(&self) -> u8 {
        match self {
            StockcastError::Io(_) | StockcastError::Output { .. } => 1,
            StockcastError::ConfigParse { .. }
            | StockcastError::ConfigMissing { .. }
            | StockcastError::ConfigInvalid { .. } => 2,
            StockcastError::Signal(_) => 4,
            StockcastError::Pipeline(_) | StockcastError::NoAssets => 5,
        }
    }
}

impl From<&StockcastError> for std::process::ExitCode {
    fn from(err: &StockcastError) -> Self {
        std::process::ExitCode::from(err.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_names_asset() {
        let err = PipelineError::InsufficientData {
            asset: "600519".into(),
            bars: 1,
            lag_depth: 2,
        };
        assert!(err.to_string().starts_with("600519:"));
    }

    #[test]
    fn pipeline_error_converts_to_top_level() {
        let err: StockcastError = PipelineError::missing_field("000001", "close").into();
        assert_eq!(err.to_string(), "000001: missing field close");
    }

    #[test]
    fn exit_status_by_category() {
        assert_eq!(StockcastError::missing("split", "train_start").status(), 2);
        assert_eq!(StockcastError::NoAssets.status(), 5);
        let signal = StockcastError::from(SignalError::MissingIndicator {
            indicator: "SMA(10)".into(),
        });
        assert_eq!(signal.status(), 4);
    }
}
