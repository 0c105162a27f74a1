use std::error::Error as StdError;

use snafu::prelude::*;

use crate::domain::entity::duration::{PhaseDuration, TryNewPhaseDurationError};

/// An abstract interface for accessing duration data.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DurationRepository: Send + Sync + 'static {
    /// Get duration of a pomodoro phase.
    ///
    /// # Errors
    ///
    /// This function will return an error if failed to get the duration.
    async fn pomodoro_duration(&self) -> Result<PhaseDuration, GetDurationError>;

    /// Get duration of a break phase.
    ///
    /// # Errors
    ///
    /// This function will return an error if failed to get the duration.
    async fn break_duration(&self) -> Result<PhaseDuration, GetDurationError>;

    /// Get the period between two title refreshes while a phase runs.
    ///
    /// # Errors
    ///
    /// This function will return an error if failed to get the duration.
    async fn refresh_interval(&self) -> Result<PhaseDuration, GetDurationError>;
}

/// An error type of accessing the repository of [`PhaseDuration`]s.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum GetDurationError {
    #[snafu(display("Could not create an invalid duration"))]
    #[non_exhaustive]
    Invalid { source: TryNewPhaseDurationError },
    #[snafu(whatever, display("Load duration failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}
