//! KDJ + RSI threshold strategy.
//!
//! Long when K, D and RSI are all strictly below their oversold levels on
//! the same bar; short (or close only) when all are strictly above their
//! overbought levels.

use crate::domain::error::SignalError;
use crate::domain::indicator::{rsi, stochastic, IndicatorField, IndicatorRef, IndicatorType};
use crate::domain::strategy::state::Target;
use crate::domain::strategy::view::IndicatorView;
use crate::domain::strategy::SignalStrategy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KdjRsiThreshold {
    pub stoch_period: usize,
    pub rsi_period: usize,
    pub stoch_oversold: f64,
    pub stoch_overbought: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub allow_short: bool,
}

impl Default for KdjRsiThreshold {
    fn default() -> Self {
        Self {
            stoch_period: stochastic::DEFAULT_PERIOD,
            rsi_period: rsi::DEFAULT_PERIOD,
            stoch_oversold: 20.0,
            stoch_overbought: 80.0,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            allow_short: false,
        }
    }
}

impl SignalStrategy for KdjRsiThreshold {
    fn name(&self) -> &'static str {
        "kdj_rsi"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Stochastic(self.stoch_period),
            IndicatorType::Rsi(self.rsi_period),
        ]
    }

    fn target(&self, view: &IndicatorView<'_>) -> Result<Option<Target>, SignalError> {
        let stoch = IndicatorType::Stochastic(self.stoch_period);
        let k = view.current(IndicatorRef::new(stoch, IndicatorField::StochasticK))?;
        let d = view.current(IndicatorRef::new(stoch, IndicatorField::StochasticD))?;
        let rsi = view.current(IndicatorRef::value(IndicatorType::Rsi(self.rsi_period)))?;

        let (Some(k), Some(d), Some(rsi)) = (k, d, rsi) else {
            return Ok(None);
        };
        if k < self.stoch_oversold && d < self.stoch_oversold && rsi < self.rsi_oversold {
            Ok(Some(Target::Long))
        } else if k > self.stoch_overbought
            && d > self.stoch_overbought
            && rsi > self.rsi_overbought
        {
            Ok(Some(Target::short_or_exit(self.allow_short)))
        } else {
            Ok(None)
        }
    }
}
