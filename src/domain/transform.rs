//! Per-column numeric transforms: log compression and fit-bounded rescaling.
//!
//! Rescaling is split into an explicit fit step producing [`ScalerParams`]
//! and an apply step consuming them. Fitting only sees rows dated on or
//! before the cutoff, so parameters never depend on later observations.

use crate::domain::bar::Field;
use crate::domain::error::PipelineError;
use crate::domain::series::AssetFrame;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMethod {
    MinMax,
    ZScore,
}

impl FromStr for ScaleMethod {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minmax" => Ok(ScaleMethod::MinMax),
            "zscore" => Ok(ScaleMethod::ZScore),
            _ => Err(PipelineError::UnsupportedMethod {
                method: s.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for ScaleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleMethod::MinMax => f.write_str("minmax"),
            ScaleMethod::ZScore => f.write_str("zscore"),
        }
    }
}

/// Replaces each listed column's value `v` with `ln(1 + v)`.
///
/// Columns not present in the frame are skipped. NaN stays NaN. Any
/// `v <= -1` fails with [`PipelineError::LogDomain`].
pub fn log_transform(frame: &AssetFrame, fields: &[Field]) -> Result<AssetFrame, PipelineError> {
    let mut out = frame.clone();
    for field in fields {
        let Some(col) = frame.column_index(field.name()) else {
            continue;
        };
        for (row, date) in out.rows.iter_mut().zip(&frame.dates) {
            let v = row[col];
            if v <= -1.0 {
                return Err(PipelineError::LogDomain {
                    asset: frame.asset.clone(),
                    field: field.name().to_string(),
                    date: *date,
                    value: v,
                });
            }
            row[col] = v.ln_1p();
        }
    }
    Ok(out)
}

/// Fitted affine parameters: `scaled = (x - offset) / scale` per column.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerParams {
    pub method: ScaleMethod,
    pub columns: Vec<String>,
    pub offsets: Vec<f64>,
    pub scales: Vec<f64>,
}

impl ScalerParams {
    /// Fits on rows dated `<= cutoff` (all rows without a cutoff), ignoring
    /// rows where any fitted column is missing. `fields = None` fits every column.
    pub fn fit(
        frame: &AssetFrame,
        fields: Option<&[Field]>,
        method: ScaleMethod,
        cutoff: Option<NaiveDate>,
    ) -> Result<Self, PipelineError> {
        let columns: Vec<String> = match fields {
            Some(fields) => fields.iter().map(|f| f.name().to_string()).collect(),
            None => frame.columns.clone(),
        };
        let indices = columns
            .iter()
            .map(|c| frame.require_column(c))
            .collect::<Result<Vec<_>, _>>()?;

        let fit_rows: Vec<&Vec<f64>> = frame
            .rows
            .iter()
            .zip(&frame.dates)
            .filter(|(_, date)| cutoff.is_none_or(|c| **date <= c))
            .map(|(row, _)| row)
            .filter(|row| indices.iter().all(|&i| !row[i].is_nan()))
            .collect();

        if fit_rows.is_empty() {
            return Err(PipelineError::EmptyFitWindow {
                asset: frame.asset.clone(),
            });
        }

        let n = fit_rows.len() as f64;
        let mut offsets = Vec::with_capacity(indices.len());
        let mut scales = Vec::with_capacity(indices.len());

        for &i in &indices {
            let values = fit_rows.iter().map(|r| r[i]);
            let (offset, spread) = match method {
                ScaleMethod::MinMax => {
                    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                    (min, max - min)
                }
                ScaleMethod::ZScore => {
                    let mean = values.clone().sum::<f64>() / n;
                    let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
                    (mean, variance.sqrt())
                }
            };
            offsets.push(offset);
            scales.push(if spread == 0.0 { 1.0 } else { spread });
        }

        debug!(
            asset = %frame.asset,
            %method,
            fit_rows = fit_rows.len(),
            ?offsets,
            ?scales,
            "fitted scaler"
        );

        Ok(Self {
            method,
            columns,
            offsets,
            scales,
        })
    }

    /// Applies the fitted transform to every row of `frame`.
    pub fn apply(&self, frame: &AssetFrame) -> Result<AssetFrame, PipelineError> {
        let indices = self
            .columns
            .iter()
            .map(|c| frame.require_column(c))
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = frame.clone();
        for row in &mut out.rows {
            for (k, &i) in indices.iter().enumerate() {
                row[i] = (row[i] - self.offsets[k]) / self.scales[k];
            }
        }
        Ok(out)
    }
}

/// Fit on the cutoff window, then transform the whole frame.
pub fn rescale(
    frame: &AssetFrame,
    fields: Option<&[Field]>,
    method: ScaleMethod,
    cutoff: Option<NaiveDate>,
) -> Result<(AssetFrame, ScalerParams), PipelineError> {
    let params = ScalerParams::fit(frame, fields, method, cutoff)?;
    let scaled = params.apply(frame)?;
    Ok((scaled, params))
}
