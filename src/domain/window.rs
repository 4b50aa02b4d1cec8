//! Lag expansion and one-step-ahead labelling.
//!
//! For lag depth `L`, each row at position `i` carries the current values of
//! every column, then the values at `i-1 .. i-(L-1)` (lag-major), and is
//! labelled with the target column at `i+1`. Positions are sequence offsets,
//! not calendar arithmetic. Rows with any undefined value are dropped without
//! reordering the survivors.

use crate::domain::error::PipelineError;
use crate::domain::series::AssetFrame;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub features: Vec<f64>,
    pub label: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLabelFrame {
    pub asset: String,
    pub feature_names: Vec<String>,
    pub target: String,
    pub rows: Vec<FeatureRow>,
}

impl FeatureLabelFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }
}

/// Column names produced for `columns` at lag depth `lag_depth`.
pub fn feature_names(columns: &[String], lag_depth: usize) -> Vec<String> {
    let mut names = columns.to_vec();
    for lag in 1..lag_depth {
        names.extend(columns.iter().map(|c| format!("{c}_lag{lag}")));
    }
    names
}

pub fn build_frame(
    frame: &AssetFrame,
    lag_depth: usize,
    target: &str,
) -> Result<FeatureLabelFrame, PipelineError> {
    if lag_depth == 0 {
        return Err(PipelineError::InvalidLagDepth(lag_depth));
    }
    let target_col = frame.require_column(target)?;
    let n = frame.len();

    let mut rows = Vec::new();
    // Row i needs i-(L-1) >= 0 for its deepest lag and i+1 < n for its label.
    for i in (lag_depth - 1)..n.saturating_sub(1) {
        let mut features = Vec::with_capacity(frame.width() * lag_depth);
        for lag in 0..lag_depth {
            features.extend_from_slice(&frame.rows[i - lag]);
        }
        let label = frame.rows[i + 1][target_col];

        if label.is_nan() || features.iter().any(|v| v.is_nan()) {
            continue;
        }
        rows.push(FeatureRow {
            date: frame.dates[i],
            features,
            label,
        });
    }

    if rows.is_empty() {
        return Err(PipelineError::InsufficientData {
            asset: frame.asset.clone(),
            bars: n,
            lag_depth,
        });
    }

    Ok(FeatureLabelFrame {
        asset: frame.asset.clone(),
        feature_names: feature_names(&frame.columns, lag_depth),
        target: target.to_string(),
        rows,
    })
}
