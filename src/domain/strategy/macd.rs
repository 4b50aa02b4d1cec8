//! MACD line / signal line crossover.

use crate::domain::error::SignalError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::{IndicatorField, IndicatorRef, IndicatorType};
use crate::domain::strategy::state::Target;
use crate::domain::strategy::view::{crossover, Cross, IndicatorView};
use crate::domain::strategy::SignalStrategy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdCrossover {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    pub allow_short: bool,
}

impl Default for MacdCrossover {
    fn default() -> Self {
        Self {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            signal: DEFAULT_SIGNAL,
            allow_short: false,
        }
    }
}

impl MacdCrossover {
    fn indicator(&self) -> IndicatorType {
        IndicatorType::Macd {
            fast: self.fast,
            slow: self.slow,
            signal: self.signal,
        }
    }
}

impl SignalStrategy for MacdCrossover {
    fn name(&self) -> &'static str {
        "macd"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.indicator()]
    }

    fn target(&self, view: &IndicatorView<'_>) -> Result<Option<Target>, SignalError> {
        let line = IndicatorRef::new(self.indicator(), IndicatorField::MacdLine);
        let signal = IndicatorRef::new(self.indicator(), IndicatorField::MacdSignal);
        Ok(match crossover(view, line, signal)? {
            Cross::Up => Some(Target::Long),
            Cross::Down => Some(Target::short_or_exit(self.allow_short)),
            Cross::None => None,
        })
    }
}
