//! Read access to precomputed indicator buffers at one bar.
//!
//! A view only exposes the current bar and the one before it, so a strategy
//! step cannot look ahead. Points still warming up read as `None`; an absent
//! or short series is an error.

use crate::domain::error::SignalError;
use crate::domain::indicator::{IndicatorRef, IndicatorSet};

#[derive(Debug, Clone, Copy)]
pub struct IndicatorView<'a> {
    indicators: &'a IndicatorSet,
    bar_index: usize,
}

impl<'a> IndicatorView<'a> {
    pub fn new(indicators: &'a IndicatorSet, bar_index: usize) -> Self {
        Self {
            indicators,
            bar_index,
        }
    }

    pub fn bar_index(&self) -> usize {
        self.bar_index
    }

    pub fn current(&self, indicator: IndicatorRef) -> Result<Option<f64>, SignalError> {
        self.read(indicator, self.bar_index)
    }

    /// Value at the previous bar, `None` on bar 0.
    pub fn previous(&self, indicator: IndicatorRef) -> Result<Option<f64>, SignalError> {
        match self.bar_index.checked_sub(1) {
            Some(index) => self.read(indicator, index),
            None => Ok(None),
        }
    }

    fn read(&self, indicator: IndicatorRef, index: usize) -> Result<Option<f64>, SignalError> {
        let series = self
            .indicators
            .get(&indicator.indicator_type)
            .ok_or_else(|| SignalError::MissingIndicator {
                indicator: indicator.indicator_type.to_string(),
            })?;
        let point = series
            .values
            .get(index)
            .ok_or_else(|| SignalError::IndicatorTooShort {
                indicator: indicator.indicator_type.to_string(),
                len: series.values.len(),
                bar_index: index,
            })?;
        let value = point
            .value
            .field(indicator.field)
            .ok_or_else(|| SignalError::WrongIndicatorShape {
                indicator: indicator.indicator_type.to_string(),
                field: indicator.field.to_string(),
            })?;
        Ok(point.valid.then_some(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    Up,
    Down,
    None,
}

fn sign(diff: f64) -> i8 {
    if diff > 0.0 {
        1
    } else if diff < 0.0 {
        -1
    } else {
        0
    }
}

/// Compares sign(fast - slow) between two consecutive bars. Equality is
/// neutral and there is no memory beyond the previous bar.
pub fn cross_between(prev: (f64, f64), curr: (f64, f64)) -> Cross {
    let prev = sign(prev.0 - prev.1);
    let curr = sign(curr.0 - curr.1);
    match curr {
        1 if prev != 1 => Cross::Up,
        -1 if prev != -1 => Cross::Down,
        _ => Cross::None,
    }
}

/// Crossover of `fast` over `slow` at the view's bar.
///
/// The current bar is read first so a missing indicator fails even on bar 0.
pub fn crossover(
    view: &IndicatorView<'_>,
    fast: IndicatorRef,
    slow: IndicatorRef,
) -> Result<Cross, SignalError> {
    let (Some(fast_curr), Some(slow_curr)) = (view.current(fast)?, view.current(slow)?) else {
        return Ok(Cross::None);
    };
    let (Some(fast_prev), Some(slow_prev)) = (view.previous(fast)?, view.previous(slow)?) else {
        return Ok(Cross::None);
    };
    Ok(cross_between(
        (fast_prev, slow_prev),
        (fast_curr, slow_curr),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{IndicatorField, IndicatorType};
    use crate::domain::strategy::test_support::{macd_series, simple_series};

    fn sma(period: usize) -> IndicatorRef {
        IndicatorRef::value(IndicatorType::Sma(period))
    }

    #[test]
    fn cross_between_signs() {
        assert_eq!(cross_between((1.0, 2.0), (3.0, 2.0)), Cross::Up);
        assert_eq!(cross_between((2.0, 2.0), (3.0, 2.0)), Cross::Up);
        assert_eq!(cross_between((3.0, 2.0), (1.0, 2.0)), Cross::Down);
        assert_eq!(cross_between((2.0, 2.0), (1.0, 2.0)), Cross::Down);
        assert_eq!(cross_between((3.0, 2.0), (4.0, 2.0)), Cross::None);
    }

    #[test]
    fn equality_never_fires() {
        assert_eq!(cross_between((1.0, 2.0), (2.0, 2.0)), Cross::None);
        assert_eq!(cross_between((3.0, 2.0), (2.0, 2.0)), Cross::None);
    }

    #[test]
    fn no_cross_on_bar_zero() {
        let set = IndicatorSet::from([
            simple_series(IndicatorType::Sma(1), &[Some(3.0)]),
            simple_series(IndicatorType::Sma(2), &[Some(2.0)]),
        ]);
        let view = IndicatorView::new(&set, 0);
        assert_eq!(crossover(&view, sma(1), sma(2)), Ok(Cross::None));
    }

    #[test]
    fn warmup_on_either_bar_suppresses_cross() {
        let set = IndicatorSet::from([
            simple_series(IndicatorType::Sma(1), &[Some(1.0), Some(3.0), Some(1.0)]),
            simple_series(IndicatorType::Sma(2), &[None, Some(2.0), None]),
        ]);
        assert_eq!(crossover(&IndicatorView::new(&set, 1), sma(1), sma(2)), Ok(Cross::None));
        assert_eq!(crossover(&IndicatorView::new(&set, 2), sma(1), sma(2)), Ok(Cross::None));
    }

    #[test]
    fn missing_indicator_is_an_error_even_on_bar_zero() {
        let set = IndicatorSet::from([simple_series(IndicatorType::Sma(1), &[Some(1.0)])]);
        let err = crossover(&IndicatorView::new(&set, 0), sma(1), sma(2)).unwrap_err();
        assert_eq!(
            err,
            SignalError::MissingIndicator {
                indicator: "SMA(2)".into()
            }
        );
    }

    #[test]
    fn short_series_is_an_error() {
        let set = IndicatorSet::from([simple_series(IndicatorType::Sma(1), &[Some(1.0)])]);
        let err = IndicatorView::new(&set, 3).current(sma(1)).unwrap_err();
        assert!(matches!(err, SignalError::IndicatorTooShort { len: 1, bar_index: 3, .. }));
    }

    #[test]
    fn wrong_component_is_an_error() {
        let ty = IndicatorType::Macd {
            fast: 2,
            slow: 3,
            signal: 2,
        };
        let set = IndicatorSet::from([macd_series(ty, &[Some((1.0, 0.5))])]);
        let view = IndicatorView::new(&set, 0);
        assert_eq!(
            view.current(IndicatorRef::new(ty, IndicatorField::MacdSignal)),
            Ok(Some(0.5))
        );
        assert!(matches!(
            view.current(IndicatorRef::new(ty, IndicatorField::StochasticK)),
            Err(SignalError::WrongIndicatorShape { .. })
        ));
    }

    #[test]
    fn previous_on_bar_zero_is_none() {
        let set = IndicatorSet::from([simple_series(IndicatorType::Sma(1), &[Some(1.0)])]);
        assert_eq!(IndicatorView::new(&set, 0).previous(sma(1)), Ok(None));
    }
}
