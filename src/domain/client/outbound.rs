use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};

use snafu::prelude::*;

pub use crate::domain::daemon::inbound::QueryResponse;

/// Launches the daemon in the background.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InitPort: Send + Sync + 'static {
    /// # Errors
    ///
    /// Fails with [`InitDaemonError::AlreadyRunning`] when a live daemon owns
    /// the PID file.
    async fn init(&self) -> Result<(), InitDaemonError>;
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InitDaemonError {
    #[snafu(display("Daemon is already running"))]
    AlreadyRunning,
    #[snafu(whatever, display("Initialization failed: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}

/// An action that changes the timer or the daemon and yields no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    StartPomodoro,
    StartBreak,
    Stop,
    Quit,
}

impl Display for ControlAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::StartPomodoro => f.write_str("start pomodoro"),
            Self::StartBreak => f.write_str("start break"),
            Self::Stop => f.write_str("stop"),
            Self::Quit => f.write_str("quit"),
        }
    }
}

/// Asks the daemon to perform a [`ControlAction`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ControlPort: Send + Sync + 'static {
    async fn control(&self, action: ControlAction) -> Result<(), RequestDaemonError>;
}

/// Reads the timer state and times from the daemon.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QueryPort: Send + Sync + 'static {
    async fn query(&self) -> Result<QueryResponse, RequestDaemonError>;
}

/// Reads the title the daemon shows. `None` means the title is cleared.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TitlePort: Send + Sync + 'static {
    async fn title(&self) -> Result<Option<String>, RequestDaemonError>;
}

/// Failure of a single request to the daemon.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum RequestDaemonError {
    #[snafu(display("Endpoint {endpoint} is unavailable"))]
    Unavailable { endpoint: String },
    #[snafu(display("Daemon replied with an unexpected message"))]
    BadResponse,
    #[snafu(whatever, display("Request failed: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError>, Some)))]
        source: Option<Box<dyn StdError>>,
    },
}
