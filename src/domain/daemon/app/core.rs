use std::sync::Arc;

use snafu::prelude::*;

use crate::domain::daemon::app::board::TitleBoard;
use crate::domain::daemon::app::service::{
    QueryService, ShutdownService, StartBreakService, StartPomodoroService, StopService,
    TitleService,
};
use crate::domain::daemon::inbound::{
    QueryPort, ShutdownPort, StartBreakPort, StartPomodoroPort, StopPort, TitlePort,
};
use crate::domain::daemon::outbound::DisplayPort;
use crate::domain::daemon::timer::{TimerConfig, TimerMachine};
use crate::domain::daemon::updater::{TickSource, UpdaterRoutine};
use crate::domain::repository::duration::GetDurationError;
use crate::domain::repository::DurationRepository;

/// Entrance to the domain logic, providing ports for external adapters.
pub struct ApplicationCore {
    pub start_pomodoro: Arc<dyn StartPomodoroPort>,
    pub start_break: Arc<dyn StartBreakPort>,
    pub stop: Arc<dyn StopPort>,
    pub query: Arc<dyn QueryPort>,
    pub title: Arc<dyn TitlePort>,
    pub shutdown: Arc<dyn ShutdownPort>,
}

impl ApplicationCore {
    /// Initialize the application by injecting external repositories and
    /// adapters. This spawns the title updater on the current runtime.
    ///
    /// # Errors
    ///
    /// This function will return an error if initialization failed.
    pub async fn setup(
        duration_repository: Arc<dyn DurationRepository>,
        display_port: Arc<dyn DisplayPort>,
        tick_source: Arc<dyn TickSource>,
    ) -> Result<ApplicationCore, SetupApplicationCoreError> {
        let config = TimerConfig {
            pomodoro_duration: duration_repository
                .pomodoro_duration()
                .await
                .context(DurationConfigSnafu { key: "pomodoro" })?
                .get(),
            break_duration: duration_repository
                .break_duration()
                .await
                .context(DurationConfigSnafu { key: "break" })?
                .get(),
        };
        let refresh = duration_repository
            .refresh_interval()
            .await
            .context(DurationConfigSnafu { key: "refresh" })?
            .get();

        let machine = TimerMachine::new(config);
        let board = Arc::new(TitleBoard::new(display_port));
        let updater = UpdaterRoutine::spawn(
            Arc::new(machine.clone()),
            Arc::clone(&board) as Arc<dyn DisplayPort>,
            tick_source,
            refresh,
        );

        let app = ApplicationCore {
            start_pomodoro: Arc::new(StartPomodoroService::new(machine.clone())),
            start_break: Arc::new(StartBreakService::new(machine.clone())),
            stop: Arc::new(StopService::new(machine.clone())),
            query: Arc::new(QueryService::new(machine.clone())),
            title: Arc::new(TitleService::new(board)),
            shutdown: Arc::new(ShutdownService::new(machine, updater)),
        };

        Ok(app)
    }
}

/// An error for initializing the application.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SetupApplicationCoreError {
    #[snafu(display("Could not load {key} duration from repository"))]
    DurationConfig {
        key: &'static str,
        source: GetDurationError,
    },
}
