//! KDJ stochastic oscillator.
//!
//! RSV[i] = (C[i] - LL(n)) / (HH(n) - LL(n)) * 100, over the last n bars.
//! K[i] = 2/3 * K[i-1] + 1/3 * RSV[i]
//! D[i] = 2/3 * D[i-1] + 1/3 * K[i]
//! J[i] = 3K[i] - 2D[i]
//!
//! K and D are seeded at 50 on the first full window. A flat window
//! (HH == LL) reads as RSV 50. Warmup: first (n-1) bars are invalid. A
//! window with a NaN high, low or close has no RSV; that point is invalid
//! and K/D carry over unchanged.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_PERIOD: usize = 9;

const SEED: f64 = 50.0;

fn rsv(window: &[Bar]) -> Option<f64> {
    if window
        .iter()
        .any(|b| b.high.is_nan() || b.low.is_nan() || b.close.is_nan())
    {
        return None;
    }
    let (low, high) = window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.low), hi.max(b.high))
        });
    let close = window[window.len() - 1].close;
    let range = high - low;
    Some(if range > 0.0 {
        (close - low) / range * 100.0
    } else {
        SEED
    })
}

pub fn calculate_stochastic(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let (mut k, mut d) = (SEED, SEED);

    for (i, bar) in bars.iter().enumerate() {
        let raw = if period > 0 && i + 1 >= period {
            rsv(&bars[i + 1 - period..=i])
        } else {
            None
        };
        let valid = raw.is_some();
        let value = match raw {
            Some(raw) => {
                k = (2.0 * k + raw) / 3.0;
                d = (2.0 * d + k) / 3.0;
                IndicatorValue::Stochastic {
                    k,
                    d,
                    j: 3.0 * k - 2.0 * d,
                }
            }
            None => IndicatorValue::Stochastic {
                k: 0.0,
                d: 0.0,
                j: 0.0,
            },
        };
        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stochastic(period),
        values,
    }
}
