//! Batch preparation of per-asset feature/label tensors.
//!
//! Each asset runs source → field selection → log transform → rescaling →
//! lag/label building → chronological split. Assets are independent: a
//! failure skips that asset and is reported, the rest of the batch proceeds,
//! and the output keeps the input asset order even when run in parallel.

use crate::domain::bar::Field;
use crate::domain::error::PipelineError;
use crate::domain::split::{split_frame, AssetSplit, Split, SplitBatch};
use crate::domain::transform::{log_transform, ScaleMethod, ScalerParams};
use crate::domain::window::build_frame;
use crate::ports::series_source::SeriesSource;
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ScalingConfig {
    pub method: ScaleMethod,
    /// `None` rescales every selected field.
    pub fields: Option<Vec<Field>>,
    pub fit_cutoff: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub fields: Vec<Field>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub log_fields: Vec<Field>,
    pub scaling: Option<ScalingConfig>,
    pub lag_depth: usize,
    pub target: Field,
    pub split: Split,
}

/// Successful per-asset output, with the scaler fitted for it (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAsset {
    pub split: AssetSplit,
    pub scaler: Option<ScalerParams>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAsset {
    pub asset: String,
    pub error: PipelineError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub batch: SplitBatch,
    pub scalers: Vec<Option<ScalerParams>>,
    pub skipped: Vec<SkippedAsset>,
}

pub fn prepare_asset(
    source: &dyn SeriesSource,
    asset: &str,
    config: &PipelineConfig,
) -> Result<PreparedAsset, PipelineError> {
    let series = source.load(asset)?;
    let frame = series.select(&config.fields, config.start_date, config.end_date);
    info!(asset = %asset, rows = frame.len(), columns = frame.width(), "loaded");

    let frame = log_transform(&frame, &config.log_fields)?;

    let (frame, scaler) = match &config.scaling {
        Some(scaling) => {
            let params = ScalerParams::fit(
                &frame,
                scaling.fields.as_deref(),
                scaling.method,
                scaling.fit_cutoff,
            )?;
            (params.apply(&frame)?, Some(params))
        }
        None => (frame, None),
    };

    let labelled = build_frame(&frame, config.lag_depth, config.target.name())?;
    Ok(PreparedAsset {
        split: split_frame(&labelled, &config.split),
        scaler,
    })
}

/// Runs every asset through [`prepare_asset`], collecting successes in input order.
pub fn run_batch(
    source: &dyn SeriesSource,
    assets: &[String],
    config: &PipelineConfig,
    parallel: bool,
) -> BatchResult {
    let outcomes: Vec<Result<PreparedAsset, PipelineError>> = if parallel {
        assets
            .par_iter()
            .map(|asset| prepare_asset(source, asset, config))
            .collect()
    } else {
        assets
            .iter()
            .map(|asset| prepare_asset(source, asset, config))
            .collect()
    };

    let mut result = BatchResult::default();
    for (asset, outcome) in assets.iter().zip(outcomes) {
        match outcome {
            Ok(prepared) => {
                result.batch.push(prepared.split);
                result.scalers.push(prepared.scaler);
            }
            Err(error) => {
                warn!(asset = %asset, %error, "skipping asset");
                result.skipped.push(SkippedAsset {
                    asset: asset.clone(),
                    error,
                });
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use crate::domain::series::AssetSeries;
    use crate::domain::split::DateRange;
    use std::collections::HashMap;

    struct MapSource(HashMap<String, Vec<Bar>>);

    impl SeriesSource for MapSource {
        fn load(&self, asset: &str) -> Result<AssetSeries, PipelineError> {
            let bars = self
                .0
                .get(asset)
                .cloned()
                .ok_or_else(|| PipelineError::source(asset, "not found"))?;
            AssetSeries::new(asset, bars)
        }

        fn list_assets(&self) -> Result<Vec<String>, PipelineError> {
            let mut assets: Vec<String> = self.0.keys().cloned().collect();
            assets.sort();
            Ok(assets)
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar::from_close(d(i as u32 + 1), *c))
            .collect()
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            fields: vec![Field::Close],
            start_date: None,
            end_date: None,
            log_fields: vec![],
            scaling: None,
            lag_depth: 2,
            target: Field::Close,
            split: Split {
                train: DateRange::new(d(1), d(3)),
                valid: DateRange::new(d(4), d(4)),
                test: DateRange::new(d(5), d(31)),
            },
        }
    }

    #[test]
    fn prepare_asset_without_scaling() {
        let source = MapSource(HashMap::from([(
            "A".to_string(),
            bars(&[10.0, 11.0, 9.0, 12.0, 8.0]),
        )]));
        let prepared = prepare_asset(&source, "A", &config()).unwrap();
        assert!(prepared.scaler.is_none());
        assert_eq!(prepared.split.train.labels.to_vec(), vec![9.0, 12.0]);
        assert_eq!(prepared.split.valid.labels.to_vec(), vec![8.0]);
        assert!(prepared.split.test.is_empty());
    }

    #[test]
    fn prepare_asset_scales_before_labelling() {
        let source = MapSource(HashMap::from([(
            "A".to_string(),
            bars(&[10.0, 20.0, 30.0, 40.0]),
        )]));
        let mut cfg = config();
        cfg.lag_depth = 1;
        cfg.scaling = Some(ScalingConfig {
            method: ScaleMethod::MinMax,
            fields: None,
            fit_cutoff: Some(d(2)),
        });
        let prepared = prepare_asset(&source, "A", &cfg).unwrap();
        // fit on [10, 20]: labels are the scaled next closes 1, 2, 3
        assert_eq!(prepared.split.train.labels.to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(prepared.scaler.unwrap().offsets, vec![10.0]);
    }

    #[test]
    fn failing_asset_is_skipped_not_fatal() {
        let source = MapSource(HashMap::from([
            ("A".to_string(), bars(&[1.0, 2.0, 3.0, 4.0])),
            ("C".to_string(), bars(&[5.0, 6.0, 7.0, 8.0])),
        ]));
        let assets = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let result = run_batch(&source, &assets, &config(), false);

        assert_eq!(result.batch.assets, vec!["A", "C"]);
        assert_eq!(result.scalers.len(), 2);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].asset, "B");
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let mut data = HashMap::new();
        let assets: Vec<String> = (0..8).map(|i| format!("A{i}")).collect();
        for (i, asset) in assets.iter().enumerate() {
            let closes: Vec<f64> = (0..10).map(|k| (k * (i + 1)) as f64).collect();
            data.insert(asset.clone(), bars(&closes));
        }
        let source = MapSource(data);
        let seq = run_batch(&source, &assets, &config(), false);
        let par = run_batch(&source, &assets, &config(), true);
        assert_eq!(seq, par);
        assert_eq!(par.batch.assets, assets);
    }
}
