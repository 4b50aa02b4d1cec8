#![allow(dead_code)]

use chrono::NaiveDate;
pub use stockcast::domain::bar::Bar;
use stockcast::domain::error::PipelineError;
use stockcast::domain::series::AssetSeries;
use stockcast::ports::series_source::SeriesSource;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub struct MockSeriesSource {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, PipelineError>,
}

impl MockSeriesSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, asset: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(asset.to_string(), bars);
        self
    }

    pub fn with_error(mut self, asset: &str, error: PipelineError) -> Self {
        self.errors.insert(asset.to_string(), error);
        self
    }
}

impl SeriesSource for MockSeriesSource {
    fn load(&self, asset: &str) -> Result<AssetSeries, PipelineError> {
        if let Some(error) = self.errors.get(asset) {
            return Err(error.clone());
        }
        let bars = self
            .data
            .get(asset)
            .cloned()
            .ok_or_else(|| PipelineError::source(asset, "no such asset"))?;
        AssetSeries::new(asset, bars)
    }

    fn list_assets(&self) -> Result<Vec<String>, PipelineError> {
        let mut assets: Vec<String> = self.data.keys().cloned().collect();
        assets.sort();
        Ok(assets)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Bar with plausible OHLC around `close` and positive volume.
pub fn make_bar(date_str: &str, close: f64) -> Bar {
    Bar {
        date: date(date_str),
        open: close * 0.99,
        close,
        high: close * 1.02,
        low: close * 0.97,
        volume: 10_000.0,
        turnover: close * 10_000.0,
        amplitude: 5.0,
        change_pct: 0.0,
        change_amt: 0.0,
        turnover_rate: 0.5,
    }
}

/// `count` consecutive calendar days of bars, closes from `closes` cycling.
pub fn generate_bars(start: &str, count: usize, closes: &[f64]) -> Vec<Bar> {
    let start = date(start);
    (0..count)
        .map(|i| {
            let close = closes[i % closes.len()];
            let mut bar = make_bar("2000-01-01", close);
            bar.date = start + chrono::Duration::days(i as i64);
            bar
        })
        .collect()
}

/// Trending series with a deterministic wobble.
pub fn trending_bars(start: &str, count: usize, base: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| base + i as f64 * 0.5 + ((i * 7) % 5) as f64 - 2.0)
        .collect();
    generate_bars(start, count, &closes)
}

/// Writes `bars` in the 12-column CSV layout to `<dir>/<asset>.csv`.
pub fn write_asset_csv(dir: &Path, asset: &str, bars: &[Bar]) {
    let mut file = std::fs::File::create(dir.join(format!("{asset}.csv"))).unwrap();
    writeln!(
        file,
        "date,code,open,close,high,low,volume,turnover,amplitude,change_pct,change_amt,turnover_rate"
    )
    .unwrap();
    for b in bars {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            b.date,
            asset,
            b.open,
            b.close,
            b.high,
            b.low,
            b.volume,
            b.turnover,
            b.amplitude,
            b.change_pct,
            b.change_amt,
            b.turnover_rate
        )
        .unwrap();
    }
}
