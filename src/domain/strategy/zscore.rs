//! Z-score mean reversion.
//!
//! Long below `-threshold`, short above `+threshold`. Short entries need no
//! permission here, unlike the other strategies.

use crate::domain::error::SignalError;
use crate::domain::indicator::{zscore::DEFAULT_WINDOW, IndicatorRef, IndicatorType};
use crate::domain::strategy::state::Target;
use crate::domain::strategy::view::IndicatorView;
use crate::domain::strategy::SignalStrategy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreReversion {
    pub window: usize,
    pub threshold: f64,
}

impl Default for ZScoreReversion {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            threshold: 2.0,
        }
    }
}

impl SignalStrategy for ZScoreReversion {
    fn name(&self) -> &'static str {
        "zscore"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::ZScore(self.window)]
    }

    fn target(&self, view: &IndicatorView<'_>) -> Result<Option<Target>, SignalError> {
        let z = view.current(IndicatorRef::value(IndicatorType::ZScore(self.window)))?;
        Ok(match z {
            Some(z) if z < -self.threshold => Some(Target::Long),
            Some(z) if z > self.threshold => Some(Target::Short),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorSet;
    use crate::domain::strategy::state::Decision;
    use crate::domain::strategy::test_support::{decisions, simple_series};

    fn set(z: &[Option<f64>]) -> IndicatorSet {
        IndicatorSet::from([simple_series(IndicatorType::ZScore(20), z)])
    }

    #[test]
    fn opens_short_without_permission() {
        let indicators = set(&[None, Some(2.5)]);
        assert_eq!(
            decisions(&ZScoreReversion::default(), &indicators, 2).unwrap(),
            vec![Decision::Hold, Decision::OpenShort]
        );
    }

    #[test]
    fn reverses_between_extremes() {
        let indicators = set(&[Some(-2.1), Some(0.0), Some(2.0), Some(3.0), Some(-3.0)]);
        assert_eq!(
            decisions(&ZScoreReversion::default(), &indicators, 5).unwrap(),
            vec![
                Decision::OpenLong,
                Decision::Hold,
                Decision::Hold,
                Decision::CloseAndOpenShort,
                Decision::CloseAndOpenLong,
            ]
        );
    }

    #[test]
    fn default_window() {
        assert_eq!(
            ZScoreReversion::default().required_indicators(),
            vec![IndicatorType::ZScore(20)]
        );
    }
}
