//! Chronological train/validation/test partitioning.
//!
//! Segments are selected by inclusive calendar date ranges. Disjointness of
//! the three ranges is left to the caller. Each asset keeps its own arrays;
//! nothing is concatenated across assets.

use crate::domain::window::FeatureLabelFrame;
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub train: DateRange,
    pub valid: DateRange,
    pub test: DateRange,
}

/// Feature matrix (rows x features) and aligned label vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentArrays {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
}

impl SegmentArrays {
    fn from_frame(frame: &FeatureLabelFrame, range: DateRange) -> Self {
        let rows: Vec<_> = frame.rows.iter().filter(|r| range.contains(r.date)).collect();
        let features = Array2::from_shape_fn((rows.len(), frame.width()), |(r, c)| {
            rows[r].features[c]
        });
        let labels = rows.iter().map(|r| r.label).collect();
        Self { features, labels }
    }

    pub fn rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn shape(&self) -> ((usize, usize), usize) {
        (self.features.dim(), self.labels.len())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetSplit {
    pub asset: String,
    pub feature_names: Vec<String>,
    pub train: SegmentArrays,
    pub valid: SegmentArrays,
    pub test: SegmentArrays,
}

/// Slices one asset's frame into the three segments and logs their shapes.
pub fn split_frame(frame: &FeatureLabelFrame, split: &Split) -> AssetSplit {
    let out = AssetSplit {
        asset: frame.asset.clone(),
        feature_names: frame.feature_names.clone(),
        train: SegmentArrays::from_frame(frame, split.train),
        valid: SegmentArrays::from_frame(frame, split.valid),
        test: SegmentArrays::from_frame(frame, split.test),
    };
    info!(
        asset = %out.asset,
        x_train = ?out.train.features.dim(),
        y_train = out.train.labels.len(),
        x_valid = ?out.valid.features.dim(),
        y_valid = out.valid.labels.len(),
        x_test = ?out.test.features.dim(),
        y_test = out.test.labels.len(),
        "split shapes"
    );
    out
}

/// Per-segment lists with one entry per asset, in input asset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitBatch {
    pub assets: Vec<String>,
    pub feature_names: Vec<Vec<String>>,
    pub x_train: Vec<Array2<f64>>,
    pub x_valid: Vec<Array2<f64>>,
    pub x_test: Vec<Array2<f64>>,
    pub y_train: Vec<Array1<f64>>,
    pub y_valid: Vec<Array1<f64>>,
    pub y_test: Vec<Array1<f64>>,
}

impl SplitBatch {
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn push(&mut self, split: AssetSplit) {
        self.assets.push(split.asset);
        self.feature_names.push(split.feature_names);
        self.x_train.push(split.train.features);
        self.y_train.push(split.train.labels);
        self.x_valid.push(split.valid.features);
        self.y_valid.push(split.valid.labels);
        self.x_test.push(split.test.features);
        self.y_test.push(split.test.labels);
    }
}

impl FromIterator<AssetSplit> for SplitBatch {
    fn from_iter<I: IntoIterator<Item = AssetSplit>>(iter: I) -> Self {
        let mut batch = SplitBatch::default();
        for split in iter {
            batch.push(split);
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::window::FeatureRow;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn frame(asset: &str, dates: &[NaiveDate]) -> FeatureLabelFrame {
        FeatureLabelFrame {
            asset: asset.into(),
            feature_names: vec!["close".into(), "close_lag1".into()],
            target: "close".into(),
            rows: dates
                .iter()
                .enumerate()
                .map(|(i, date)| FeatureRow {
                    date: *date,
                    features: vec![i as f64, i as f64 - 1.0],
                    label: i as f64 + 1.0,
                })
                .collect(),
        }
    }

    fn split() -> Split {
        Split {
            train: DateRange::new(d(1, 1), d(1, 31)),
            valid: DateRange::new(d(2, 1), d(2, 29)),
            test: DateRange::new(d(3, 1), d(3, 31)),
        }
    }

    #[test]
    fn date_range_is_inclusive() {
        let r = DateRange::new(d(1, 2), d(1, 4));
        assert!(!r.contains(d(1, 1)));
        assert!(r.contains(d(1, 2)));
        assert!(r.contains(d(1, 4)));
        assert!(!r.contains(d(1, 5)));
    }

    #[test]
    fn rows_land_in_their_segment() {
        let f = frame("000001", &[d(1, 30), d(1, 31), d(2, 1), d(3, 1), d(4, 1)]);
        let s = split_frame(&f, &split());

        assert_eq!(s.train.shape(), ((2, 2), 2));
        assert_eq!(s.valid.shape(), ((1, 2), 1));
        assert_eq!(s.test.shape(), ((1, 2), 1));
        assert_eq!(s.train.labels.to_vec(), vec![1.0, 2.0]);
        assert_eq!(s.valid.features.row(0).to_vec(), vec![2.0, 1.0]);
        assert_eq!(s.test.labels.to_vec(), vec![4.0]);
    }

    #[test]
    fn empty_segment_keeps_feature_width() {
        let f = frame("000001", &[d(1, 5), d(1, 6)]);
        let s = split_frame(&f, &split());
        assert!(s.valid.is_empty());
        assert_eq!(s.valid.shape(), ((0, 2), 0));
        assert_eq!(s.test.rows(), 0);
    }

    #[test]
    fn overlapping_ranges_are_not_rejected() {
        let f = frame("000001", &[d(1, 5)]);
        let overlapping = Split {
            train: DateRange::new(d(1, 1), d(1, 31)),
            valid: DateRange::new(d(1, 1), d(1, 31)),
            test: DateRange::new(d(3, 1), d(3, 31)),
        };
        let s = split_frame(&f, &overlapping);
        assert_eq!(s.train.rows(), 1);
        assert_eq!(s.valid.rows(), 1);
    }

    #[test]
    fn batch_preserves_asset_order_and_boundaries() {
        let a = split_frame(&frame("A", &[d(1, 1), d(1, 2)]), &split());
        let b = split_frame(&frame("B", &[d(1, 1)]), &split());
        let batch: SplitBatch = vec![a, b].into_iter().collect();

        assert_eq!(batch.assets, vec!["A", "B"]);
        assert_eq!(batch.feature_names[1], vec!["close", "close_lag1"]);
        assert_eq!(batch.x_train.len(), 2);
        assert_eq!(batch.x_train[0].nrows(), 2);
        assert_eq!(batch.x_train[1].nrows(), 1);
        assert_eq!(batch.y_test.len(), 2);
    }
}
