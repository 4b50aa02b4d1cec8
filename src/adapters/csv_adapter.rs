//! CSV file series source.
//!
//! One file per asset, `<base_path>/<asset>.csv`, with a header row and the
//! fixed 12-column layout: date, code, then the ten numeric fields in
//! [`Field::ALL`] order. Columns are read by position; empty cells are NaN.

use crate::domain::bar::{Bar, Field};
use crate::domain::error::PipelineError;
use crate::domain::series::AssetSeries;
use crate::ports::series_source::SeriesSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const DATE_COLUMN: &str = "date";
const CODE_COLUMN: &str = "code";
const COLUMN_COUNT: usize = 2 + Field::ALL.len();

pub struct CsvSeriesSource {
    base_path: PathBuf,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl CsvSeriesSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            start_date: None,
            end_date: None,
        }
    }

    /// Keeps only bars dated within `[start, end]` (either bound optional).
    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    fn csv_path(&self, asset: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", asset))
    }

    fn in_range(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|s| date >= s) && self.end_date.is_none_or(|e| date <= e)
    }
}

fn column_name(index: usize) -> &'static str {
    match index {
        0 => DATE_COLUMN,
        1 => CODE_COLUMN,
        i => Field::ALL[i - 2].name(),
    }
}

fn parse_value(asset: &str, field: Field, raw: &str, line: u64) -> Result<f64, PipelineError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|e| {
        PipelineError::source(
            asset,
            format!("line {}: invalid {} value '{}': {}", line, field, raw, e),
        )
    })
}

impl SeriesSource for CsvSeriesSource {
    fn load(&self, asset: &str) -> Result<AssetSeries, PipelineError> {
        let path = self.csv_path(asset);
        let content = fs::read_to_string(&path).map_err(|e| {
            PipelineError::source(asset, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let header_len = rdr
            .headers()
            .map_err(|e| PipelineError::source(asset, format!("CSV header error: {}", e)))?
            .len();
        if header_len < COLUMN_COUNT {
            return Err(PipelineError::missing_field(asset, column_name(header_len)));
        }

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| PipelineError::source(asset, format!("CSV parse error: {}", e)))?;
            let line = record.position().map_or(0, |p| p.line());

            let date_str = record.get(0).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                PipelineError::source(
                    asset,
                    format!("line {}: invalid date '{}': {}", line, date_str, e),
                )
            })?;
            if !self.in_range(date) {
                continue;
            }

            let mut values = [f64::NAN; 10];
            for (i, (slot, field)) in values.iter_mut().zip(Field::ALL).enumerate() {
                let raw = record.get(2 + i).unwrap_or_default();
                *slot = parse_value(asset, field, raw, line)?;
            }
            let [
                open,
                close,
                high,
                low,
                volume,
                turnover,
                amplitude,
                change_pct,
                change_amt,
                turnover_rate,
            ] = values;

            bars.push(Bar {
                date,
                open,
                close,
                high,
                low,
                volume,
                turnover,
                amplitude,
                change_pct,
                change_amt,
                turnover_rate,
            });
        }

        debug!(asset = %asset, path = %path.display(), bars = bars.len(), "read series");
        AssetSeries::new(asset, bars)
    }

    fn list_assets(&self) -> Result<Vec<String>, PipelineError> {
        let dir = self.base_path.display().to_string();
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| PipelineError::source(&dir, format!("failed to read directory: {}", e)))?;

        let mut assets = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| PipelineError::source(&dir, format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            if let Some(asset) = name.to_string_lossy().strip_suffix(".csv") {
                assets.push(asset.to_string());
            }
        }

        assets.sort();
        Ok(assets)
    }
}
