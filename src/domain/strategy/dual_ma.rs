//! Fast/slow simple moving-average crossover.

use crate::domain::error::SignalError;
use crate::domain::indicator::{IndicatorRef, IndicatorType};
use crate::domain::strategy::state::Target;
use crate::domain::strategy::view::{crossover, Cross, IndicatorView};
use crate::domain::strategy::SignalStrategy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualMaCrossover {
    pub fast: usize,
    pub slow: usize,
    pub allow_short: bool,
}

impl Default for DualMaCrossover {
    fn default() -> Self {
        Self {
            fast: 10,
            slow: 20,
            allow_short: false,
        }
    }
}

impl SignalStrategy for DualMaCrossover {
    fn name(&self) -> &'static str {
        "dual_ma"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Sma(self.fast), IndicatorType::Sma(self.slow)]
    }

    fn target(&self, view: &IndicatorView<'_>) -> Result<Option<Target>, SignalError> {
        let fast = IndicatorRef::value(IndicatorType::Sma(self.fast));
        let slow = IndicatorRef::value(IndicatorType::Sma(self.slow));
        Ok(match crossover(view, fast, slow)? {
            Cross::Up => Some(Target::Long),
            Cross::Down => Some(Target::short_or_exit(self.allow_short)),
            Cross::None => None,
        })
    }
}
