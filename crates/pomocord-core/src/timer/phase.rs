use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::storage::Settings;

/// Where the cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short break",
            Phase::LongBreak => "Long break",
        }
    }

    /// Configured length in minutes. Idle has none.
    pub fn duration_min(self, settings: &Settings) -> u64 {
        match self {
            Phase::Idle => 0,
            Phase::Focus => settings.focus,
            Phase::ShortBreak => settings.short_break,
            Phase::LongBreak => settings.long_break,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Short,
    Long,
}

impl BreakKind {
    /// Break that follows the `completed`-th focus phase.
    ///
    /// A long break lands on every multiple of `interval`; an interval
    /// of zero is treated as one.
    pub fn after(completed: u64, interval: u64) -> Self {
        if completed > 0 && completed % interval.max(1) == 0 {
            BreakKind::Long
        } else {
            BreakKind::Short
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            BreakKind::Short => Phase::ShortBreak,
            BreakKind::Long => Phase::LongBreak,
        }
    }

    pub fn duration_min(self, settings: &Settings) -> u64 {
        self.phase().duration_min(settings)
    }
}

/// Focus phases still to complete before the next long break.
pub fn focus_until_long_break(completed: u64, interval: u64) -> u64 {
    let interval = interval.max(1);
    interval - completed % interval
}

/// Minutes to a sleep duration, saturating instead of overflowing.
pub fn minutes(min: u64) -> Duration {
    Duration::from_secs(min.saturating_mul(60))
}
