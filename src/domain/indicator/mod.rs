//! Technical indicator series computed causally from bars.
//!
//! - `IndicatorPoint`: one point of an indicator series, with a warmup flag
//! - `IndicatorValue`: the output shape of an indicator at one bar
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorRef`: an indicator plus the component a strategy reads
//! - `IndicatorSet`: the precomputed buffers a strategy run consumes
//!
//! Every value at bar `i` depends only on bars `0..=i`.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod zscore;

pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::calculate_stochastic;
pub use zscore::calculate_zscore;

use crate::domain::bar::{Bar, Field};
use crate::domain::error::SignalError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd { line: f64, signal: f64, histogram: f64 },
    Stochastic { k: f64, d: f64, j: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    ZScore(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorField {
    Value,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    StochasticK,
    StochasticD,
    StochasticJ,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorRef {
    pub indicator_type: IndicatorType,
    pub field: IndicatorField,
}

impl IndicatorRef {
    pub fn new(indicator_type: IndicatorType, field: IndicatorField) -> Self {
        Self {
            indicator_type,
            field,
        }
    }

    pub fn value(indicator_type: IndicatorType) -> Self {
        Self::new(indicator_type, IndicatorField::Value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

pub type IndicatorSet = HashMap<IndicatorType, IndicatorSeries>;

impl IndicatorValue {
    /// Component `field` of this value, or `None` if the shape has no such component.
    pub fn field(&self, field: IndicatorField) -> Option<f64> {
        match (self, field) {
            (IndicatorValue::Simple(v), IndicatorField::Value) => Some(*v),
            (IndicatorValue::Macd { line, .. }, IndicatorField::MacdLine) => Some(*line),
            (IndicatorValue::Macd { signal, .. }, IndicatorField::MacdSignal) => Some(*signal),
            (IndicatorValue::Macd { histogram, .. }, IndicatorField::MacdHistogram) => {
                Some(*histogram)
            }
            (IndicatorValue::Stochastic { k, .. }, IndicatorField::StochasticK) => Some(*k),
            (IndicatorValue::Stochastic { d, .. }, IndicatorField::StochasticD) => Some(*d),
            (IndicatorValue::Stochastic { j, .. }, IndicatorField::StochasticJ) => Some(*j),
            _ => None,
        }
    }
}

impl IndicatorType {
    /// Bar fields the indicator reads.
    pub fn inputs(&self) -> &'static [Field] {
        match self {
            IndicatorType::Stochastic(_) => &[Field::Close, Field::High, Field::Low],
            _ => &[Field::Close],
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::ZScore(window) => write!(f, "ZSCORE({})", window),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic(period) => write!(f, "KDJ({})", period),
        }
    }
}

impl fmt::Display for IndicatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorField::Value => "value",
            IndicatorField::MacdLine => "line",
            IndicatorField::MacdSignal => "signal",
            IndicatorField::MacdHistogram => "histogram",
            IndicatorField::StochasticK => "k",
            IndicatorField::StochasticD => "d",
            IndicatorField::StochasticJ => "j",
        };
        f.write_str(name)
    }
}

impl fmt::Display for IndicatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            IndicatorField::Value => write!(f, "{}", self.indicator_type),
            field => write!(f, "{}.{}", self.indicator_type, field),
        }
    }
}

pub fn calculate(bars: &[Bar], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::Ema(period) => calculate_ema(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::ZScore(window) => calculate_zscore(bars, window),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
        IndicatorType::Stochastic(period) => calculate_stochastic(bars, period),
    }
}

/// Fails on the first bar where `indicator_type` would read a missing or
/// non-finite input.
pub fn check_inputs(bars: &[Bar], indicator_type: IndicatorType) -> Result<(), SignalError> {
    for bar in bars {
        if let Some(field) = indicator_type
            .inputs()
            .iter()
            .find(|f| !bar.get(**f).is_finite())
        {
            return Err(SignalError::MissingInput {
                indicator: indicator_type.to_string(),
                field: field.name().to_string(),
                date: bar.date,
            });
        }
    }
    Ok(())
}

/// Computes every requested series. A missing input anywhere fails the whole set.
pub fn compute_indicators(
    bars: &[Bar],
    types: &[IndicatorType],
) -> Result<IndicatorSet, SignalError> {
    let mut set = IndicatorSet::with_capacity(types.len());
    for t in types {
        check_inputs(bars, *t)?;
        set.insert(*t, calculate(bars, *t));
    }
    Ok(set)
}

/// Raw values of a single-valued series, 0.0 while warming up.
pub(crate) fn raw_values(series: &IndicatorSeries) -> Vec<f64> {
    series
        .values
        .iter()
        .map(|p| match (p.valid, &p.value) {
            (true, IndicatorValue::Simple(v)) => *v,
            _ => 0.0,
        })
        .collect()
}
