//! Per-asset series and field-selected frames.
//!
//! An [`AssetSeries`] is the ingested, date-ordered bar sequence for one asset.
//! An [`AssetFrame`] is the numeric table the preprocessing stages operate on:
//! one row per date, one column per selected field.

use crate::domain::bar::{Bar, Field};
use crate::domain::error::PipelineError;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct AssetSeries {
    pub asset: String,
    pub bars: Vec<Bar>,
}

impl AssetSeries {
    /// Orders bars by date and rejects repeated dates.
    pub fn new(asset: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self, PipelineError> {
        let asset = asset.into();
        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(PipelineError::DuplicateDate {
                asset,
                date: pair[1].date,
            });
        }
        Ok(Self { asset, bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Projects `fields` over the bars dated within `[start, end]` (either bound optional).
    pub fn select(
        &self,
        fields: &[Field],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AssetFrame {
        let in_range = |d: NaiveDate| start.is_none_or(|s| d >= s) && end.is_none_or(|e| d <= e);
        let kept: Vec<&Bar> = self.bars.iter().filter(|b| in_range(b.date)).collect();

        AssetFrame {
            asset: self.asset.clone(),
            columns: fields.iter().map(|f| f.name().to_string()).collect(),
            dates: kept.iter().map(|b| b.date).collect(),
            rows: kept
                .iter()
                .map(|b| fields.iter().map(|f| b.get(*f)).collect())
                .collect(),
        }
    }
}

/// Row-major numeric table for one asset. NaN marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFrame {
    pub asset: String,
    pub columns: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<f64>>,
}

impl AssetFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Resolves `name` or reports it as a missing field of this asset.
    pub fn require_column(&self, name: &str) -> Result<usize, PipelineError> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::missing_field(&self.asset, name))
    }

    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[index]).collect()
    }
}
