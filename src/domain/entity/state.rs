use std::fmt::{Display, Formatter, Result as FmtResult};

/// The state of the pomodoro timer. Exactly one is current at any instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimerState {
    #[default]
    Idle,
    PomodoroRunning,
    BreakRunning,
}

impl TimerState {
    /// Returns `true` if a countdown is in flight in this [`TimerState`].
    pub fn is_running(self) -> bool {
        matches!(self, Self::PomodoroRunning | Self::BreakRunning)
    }
}

impl Display for TimerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::PomodoroRunning => f.write_str("PomodoroRunning"),
            Self::BreakRunning => f.write_str("BreakRunning"),
        }
    }
}
