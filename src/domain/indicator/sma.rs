//! Simple Moving Average of closing prices.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]), maintained as a running window sum.
//! Warmup: first (n-1) bars are invalid, as is any window holding a NaN close.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut sum = 0.0;
    let mut missing = 0usize;

    for (i, bar) in bars.iter().enumerate() {
        if bar.close.is_nan() {
            missing += 1;
        } else {
            sum += bar.close;
        }
        if i >= period {
            let dropped = bars[i - period].close;
            if dropped.is_nan() {
                missing -= 1;
            } else {
                sum -= dropped;
            }
        }
        let valid = i + 1 >= period && missing == 0;
        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(if valid { sum / period as f64 } else { 0.0 }),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
