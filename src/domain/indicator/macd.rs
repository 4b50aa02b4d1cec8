//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded once the line is defined
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 + signal - 1 bars

use crate::domain::bar::Bar;
use crate::domain::indicator::ema::ema_points;
use crate::domain::indicator::{
    calculate_ema, raw_values, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[Bar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    if bars.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let ema_fast = raw_values(&calculate_ema(bars, fast));
    let ema_slow = raw_values(&calculate_ema(bars, slow));
    let macd_line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();

    let line_warmup = fast.max(slow) - 1;
    let mut signal_line = vec![0.0; bars.len()];
    let mut signal_valid = vec![false; bars.len()];
    let defined = bars
        .iter()
        .zip(&macd_line)
        .skip(line_warmup)
        .map(|(b, m)| (b.date, *m));
    for (offset, point) in ema_points(defined, signal_period).into_iter().enumerate() {
        if let IndicatorValue::Simple(v) = point.value {
            signal_line[line_warmup + offset] = v;
        }
        signal_valid[line_warmup + offset] = point.valid;
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            valid: signal_valid[i],
            value: IndicatorValue::Macd {
                line: macd_line[i],
                signal: signal_line[i],
                histogram: macd_line[i] - signal_line[i],
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[Bar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
