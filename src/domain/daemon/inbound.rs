use tokio::time::Duration;

/// A public port for starting a pomodoro.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StartPomodoroPort: Send + Sync + 'static {
    /// Start a pomodoro unless one is already running.
    async fn start_pomodoro(&self);
}

/// A public port for starting a break.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StartBreakPort: Send + Sync + 'static {
    /// Start a break unless one is already running.
    async fn start_break(&self);
}

/// A public port for stopping the running phase.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StopPort: Send + Sync + 'static {
    /// Cancel the running countdown and go idle.
    async fn stop(&self);
}

/// A public port for querying the current state.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QueryPort: Send + Sync + 'static {
    /// Do the query operation.
    async fn query(&self) -> QueryResponse;
}

/// The state of the timer as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub state: String,
    pub total: Duration,
    pub remaining: Duration,
}

/// A public port for reading the title currently shown.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TitlePort: Send + Sync + 'static {
    /// Returns the shown title, or `None` if it is cleared.
    async fn title(&self) -> Option<String>;
}

/// A public port for tearing the application down before the daemon exits.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ShutdownPort: Send + Sync + 'static {
    /// Stop the timer and the title updater.
    async fn shutdown(&self);
}
