//! Bar-by-bar trading decision state machines.
//!
//! Every strategy reads precomputed indicator buffers through an
//! [`IndicatorView`] and names a [`Target`] direction (or none). The shared
//! transition table in [`state`] turns that into the next position and a
//! [`Decision`] for an external execution engine.

pub mod dual_ma;
pub mod kdj_rsi;
pub mod macd;
pub mod state;
pub mod view;
pub mod zscore;

pub use dual_ma::DualMaCrossover;
pub use kdj_rsi::KdjRsiThreshold;
pub use macd::MacdCrossover;
pub use state::{Decision, Position, StrategyState, Target};
pub use view::{Cross, IndicatorView};
pub use zscore::ZScoreReversion;

use crate::domain::bar::Bar;
use crate::domain::error::SignalError;
use crate::domain::indicator::{compute_indicators, IndicatorSet, IndicatorType};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

pub trait SignalStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Indicator series this strategy reads; the caller computes exactly these.
    fn required_indicators(&self) -> Vec<IndicatorType>;

    /// Direction wanted after the view's bar, `None` to stay put.
    fn target(&self, view: &IndicatorView<'_>) -> Result<Option<Target>, SignalError>;

    fn init(&self) -> StrategyState {
        StrategyState::default()
    }

    fn step(
        &self,
        state: StrategyState,
        indicators: &IndicatorSet,
        bar_index: usize,
    ) -> Result<(StrategyState, Decision), SignalError> {
        let target = self.target(&IndicatorView::new(indicators, bar_index))?;
        Ok(state.transition(target))
    }
}

/// Which strategy to run, with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    DualMa(DualMaCrossover),
    Macd(MacdCrossover),
    KdjRsi(KdjRsiThreshold),
    ZScore(ZScoreReversion),
}

impl StrategyConfig {
    pub const KINDS: [&'static str; 4] = ["dual_ma", "macd", "kdj_rsi", "zscore"];

    pub fn build(&self) -> Box<dyn SignalStrategy> {
        match self {
            StrategyConfig::DualMa(s) => Box::new(*s),
            StrategyConfig::Macd(s) => Box::new(*s),
            StrategyConfig::KdjRsi(s) => Box::new(*s),
            StrategyConfig::ZScore(s) => Box::new(*s),
        }
    }
}

/// One bar of a strategy run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub position: Position,
    pub decision: Decision,
}

/// Runs `strategy` over every bar, threading its state from bar to bar.
pub fn run_strategy(
    strategy: &dyn SignalStrategy,
    bars: &[Bar],
    indicators: &IndicatorSet,
) -> Result<Vec<SignalRecord>, SignalError> {
    let mut state = strategy.init();
    let mut records = Vec::with_capacity(bars.len());

    for (bar_index, bar) in bars.iter().enumerate() {
        let (next, decision) = strategy.step(state, indicators, bar_index)?;
        if decision != Decision::Hold {
            debug!(date = %bar.date, %decision, position = %next.position, "decision");
        }
        state = next;
        records.push(SignalRecord {
            date: bar.date,
            position: state.position,
            decision,
        });
    }

    let trades = records.iter().filter(|r| r.decision != Decision::Hold).count();
    info!(
        strategy = strategy.name(),
        bars = bars.len(),
        trades,
        final_position = %state.position,
        "strategy run complete"
    );
    Ok(records)
}

/// Computes the strategy's indicators from `bars` and runs it.
pub fn run_on_bars(
    strategy: &dyn SignalStrategy,
    bars: &[Bar],
) -> Result<Vec<SignalRecord>, SignalError> {
    let indicators = compute_indicators(bars, &strategy.required_indicators())?;
    run_strategy(strategy, bars, &indicators)
}
