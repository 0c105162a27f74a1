use std::time::Duration;

use snafu::prelude::*;

/// A positive duration configured for a timer phase or a refresh period,
/// represented in seconds and capped at [`PhaseDuration::MAX_SECONDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhaseDuration(Duration);

impl PhaseDuration {
    /// One week. Deadlines stay far from `Instant` overflow.
    pub const MAX_SECONDS: u64 = 7 * 24 * 60 * 60;

    /// Try to create a [`PhaseDuration`] from a number of seconds.
    ///
    /// # Errors
    ///
    /// This function will return an error if the integer is zero or above
    /// [`PhaseDuration::MAX_SECONDS`].
    pub fn try_new(seconds: u64) -> Result<Self, TryNewPhaseDurationError> {
        ensure!(seconds > 0, ZeroSnafu);
        ensure!(seconds <= Self::MAX_SECONDS, TooLargeSnafu { seconds });
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Returns the inner [`Duration`].
    pub fn get(self) -> Duration {
        self.0
    }
}

impl TryFrom<u64> for PhaseDuration {
    type Error = TryNewPhaseDurationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<PhaseDuration> for Duration {
    fn from(value: PhaseDuration) -> Self {
        value.0
    }
}

/// An error type of creating a [`PhaseDuration`].
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum TryNewPhaseDurationError {
    #[snafu(display("Duration must be greater than zero"))]
    #[non_exhaustive]
    Zero,
    #[snafu(display("Duration of {seconds}s exceeds one week"))]
    #[non_exhaustive]
    TooLarge { seconds: u64 },
}
