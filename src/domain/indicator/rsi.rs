//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! - First average: simple mean of the first n gains/losses
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss); RSI = 100 when avg_loss == 0.
//! Warmup: first n bars are invalid (n price changes are needed).

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_PERIOD: usize = 14;

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = bars
        .iter()
        .map(|b| IndicatorPoint {
            date: b.date,
            valid: false,
            value: IndicatorValue::Simple(0.0),
        })
        .collect();

    if period > 0 {
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for i in 1..bars.len() {
            let change = bars[i].close - bars[i - 1].close;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);

            if i < period {
                avg_gain += gain;
                avg_loss += loss;
                continue;
            }
            if i == period {
                avg_gain = (avg_gain + gain) / period as f64;
                avg_loss = (avg_loss + loss) / period as f64;
            } else {
                avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
                avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
            }
            values[i].valid = true;
            values[i].value = IndicatorValue::Simple(rsi_from(avg_gain, avg_loss));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
