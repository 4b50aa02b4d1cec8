//! Rolling z-score of closing prices.
//!
//! Z(n)[i] = (C[i] - mean(C[i-n+1..=i])) / std(C[i-n+1..=i]), with the
//! sample standard deviation (n-1 denominator). Needs n >= 2.
//! Warmup: first (n-1) bars are invalid. A window with zero spread has no
//! defined z-score and stays invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_WINDOW: usize = 20;

fn zscore(window: &[Bar]) -> Option<f64> {
    let n = window.len() as f64;
    let mean = window.iter().map(|b| b.close).sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|b| (b.close - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let std = variance.sqrt();
    if std > 0.0 && std.is_finite() {
        Some((window[window.len() - 1].close - mean) / std)
    } else {
        None
    }
}

pub fn calculate_zscore(bars: &[Bar], window: usize) -> IndicatorSeries {
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let z = if window >= 2 && i + 1 >= window {
                zscore(&bars[i + 1 - window..=i])
            } else {
                None
            };
            IndicatorPoint {
                date: bar.date,
                valid: z.is_some(),
                value: IndicatorValue::Simple(z.unwrap_or(0.0)),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::ZScore(window),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::{make_bars, simple};
    use approx::assert_abs_diff_eq;

    #[test]
    fn zscore_warmup() {
        let series = calculate_zscore(&make_bars(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert_eq!(series.indicator_type, IndicatorType::ZScore(3));
    }

    #[test]
    fn zscore_uses_sample_std() {
        // window [1, 2, 3]: mean 2, sample std 1
        let series = calculate_zscore(&make_bars(&[1.0, 2.0, 3.0]), 3);
        assert_abs_diff_eq!(simple(&series.values[2].value), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zscore_spike_is_large() {
        let mut closes = vec![10.0, 10.5, 9.5, 10.0, 10.2, 9.8];
        closes.push(20.0);
        let series = calculate_zscore(&make_bars(&closes), 5);
        assert!(simple(&series.values[6].value) > 1.5);
    }

    #[test]
    fn flat_window_is_invalid() {
        let series = calculate_zscore(&make_bars(&[3.0, 3.0, 3.0, 4.0]), 3);
        assert!(!series.values[2].valid);
        assert_abs_diff_eq!(simple(&series.values[2].value), 0.0);
        assert!(series.values[3].valid);
    }

    #[test]
    fn window_below_two_is_all_invalid() {
        for window in [0, 1] {
            let series = calculate_zscore(&make_bars(&[1.0, 2.0]), window);
            assert_eq!(series.values.len(), 2);
            assert!(series.values.iter().all(|p| !p.valid));
        }
    }
}
