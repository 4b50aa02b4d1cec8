//! CSV export of prepared arrays and strategy decisions.
//!
//! Split arrays go to `<dir>/<asset>_<segment>_{x,y}.csv`: the feature file
//! carries one header column per feature name, the label file a single
//! `label` column. Decision streams are `date,position,decision` rows.

use crate::domain::error::StockcastError;
use crate::domain::split::SplitBatch;
use crate::domain::strategy::SignalRecord;
use ndarray::{Array1, Array2};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

fn output_error(path: &Path, e: impl std::fmt::Display) -> StockcastError {
    StockcastError::Output {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn write_features(path: &Path, names: &[String], x: &Array2<f64>) -> Result<(), StockcastError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| output_error(path, e))?;
    wtr.write_record(names).map_err(|e| output_error(path, e))?;
    for row in x.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| output_error(path, e))?;
    }
    wtr.flush().map_err(|e| output_error(path, e))
}

fn write_labels(path: &Path, y: &Array1<f64>) -> Result<(), StockcastError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| output_error(path, e))?;
    wtr.write_record(["label"]).map_err(|e| output_error(path, e))?;
    for v in y {
        wtr.write_record([v.to_string()])
            .map_err(|e| output_error(path, e))?;
    }
    wtr.flush().map_err(|e| output_error(path, e))
}

/// Writes every asset's train/valid/test arrays under `dir`, returning the
/// files written in asset order.
pub fn write_split_batch(dir: &Path, batch: &SplitBatch) -> Result<Vec<PathBuf>, StockcastError> {
    fs::create_dir_all(dir).map_err(|e| output_error(dir, e))?;

    let mut written = Vec::with_capacity(batch.len() * 6);
    for (i, asset) in batch.assets.iter().enumerate() {
        let segments = [
            ("train", &batch.x_train[i], &batch.y_train[i]),
            ("valid", &batch.x_valid[i], &batch.y_valid[i]),
            ("test", &batch.x_test[i], &batch.y_test[i]),
        ];
        for (segment, x, y) in segments {
            let x_path = dir.join(format!("{}_{}_x.csv", asset, segment));
            let y_path = dir.join(format!("{}_{}_y.csv", asset, segment));
            write_features(&x_path, &batch.feature_names[i], x)?;
            write_labels(&y_path, y)?;
            written.push(x_path);
            written.push(y_path);
        }
        debug!(asset = %asset, dir = %dir.display(), "wrote split arrays");
    }
    Ok(written)
}

/// Serializes decision records as CSV to any writer (a file or stdout).
pub fn write_signal_records<W: Write>(
    writer: W,
    records: &[SignalRecord],
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_signal_file(path: &Path, records: &[SignalRecord]) -> Result<(), StockcastError> {
    let file = File::create(path).map_err(|e| output_error(path, e))?;
    write_signal_records(file, records).map_err(|e| output_error(path, e))
}
