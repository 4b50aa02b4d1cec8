//! Exponential Moving Average of closing prices.
//!
//! k = 2/(n+1), seeded with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). Warmup: first (n-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_ema(bars: &[Bar], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values: ema_points(bars.iter().map(|b| (b.date, b.close)), period),
    }
}

/// EMA over an arbitrary dated input stream; shared with MACD's signal line.
pub(crate) fn ema_points<I>(input: I, period: usize) -> Vec<IndicatorPoint>
where
    I: IntoIterator<Item = (chrono::NaiveDate, f64)>,
{
    if period == 0 {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;
    let mut values = Vec::new();

    for (i, (date, x)) in input.into_iter().enumerate() {
        let valid = if i + 1 < period {
            sum += x;
            false
        } else if i + 1 == period {
            sum += x;
            ema = sum / period as f64;
            true
        } else {
            ema = x * k + ema * (1.0 - k);
            true
        };
        values.push(IndicatorPoint {
            date,
            valid,
            value: IndicatorValue::Simple(if valid { ema } else { 0.0 }),
        });
    }

    values
}
