//! Position state and the transition table shared by every strategy.
//!
//! | current | Long             | Short             | Exit      |
//! |---------|------------------|-------------------|-----------|
//! | Flat    | OpenLong         | OpenShort         | Hold      |
//! | Long    | Hold             | CloseAndOpenShort | CloseOnly |
//! | Short   | CloseAndOpenLong | Hold              | CloseOnly |

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Flat,
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    OpenLong,
    OpenShort,
    CloseAndOpenLong,
    CloseAndOpenShort,
    CloseOnly,
    Hold,
}

/// Direction a strategy wants to be in after this bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Long,
    Short,
    /// A short signal without permission to short: close whatever is open.
    Exit,
}

impl Target {
    pub fn short_or_exit(allow_short: bool) -> Self {
        if allow_short {
            Target::Short
        } else {
            Target::Exit
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrategyState {
    pub position: Position,
}

impl StrategyState {
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    /// Applies `target` (or nothing) to the current position.
    pub fn transition(self, target: Option<Target>) -> (StrategyState, Decision) {
        let Some(target) = target else {
            return (self, Decision::Hold);
        };
        let (position, decision) = match (self.position, target) {
            (Position::Flat, Target::Long) => (Position::Long, Decision::OpenLong),
            (Position::Flat, Target::Short) => (Position::Short, Decision::OpenShort),
            (Position::Flat, Target::Exit) => (Position::Flat, Decision::Hold),
            (Position::Long, Target::Long) => (Position::Long, Decision::Hold),
            (Position::Long, Target::Short) => (Position::Short, Decision::CloseAndOpenShort),
            (Position::Short, Target::Long) => (Position::Long, Decision::CloseAndOpenLong),
            (Position::Short, Target::Short) => (Position::Short, Decision::Hold),
            (Position::Long | Position::Short, Target::Exit) => {
                (Position::Flat, Decision::CloseOnly)
            }
        };
        (StrategyState { position }, decision)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::Flat => "flat",
            Position::Long => "long",
            Position::Short => "short",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::OpenLong => "open_long",
            Decision::OpenShort => "open_short",
            Decision::CloseAndOpenLong => "close_and_open_long",
            Decision::CloseAndOpenShort => "close_and_open_short",
            Decision::CloseOnly => "close_only",
            Decision::Hold => "hold",
        };
        f.write_str(s)
    }
}
