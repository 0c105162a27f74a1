use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::daemon::app::board::TitleBoard;
use crate::domain::daemon::inbound::{
    QueryPort, QueryResponse, ShutdownPort, StartBreakPort, StartPomodoroPort, StopPort, TitlePort,
};
use crate::domain::daemon::timer::{TimerMachine, TimerSnapshot};
use crate::domain::daemon::updater::UpdaterHandle;

pub struct StartPomodoroService {
    machine: TimerMachine,
}

impl StartPomodoroService {
    pub fn new(machine: TimerMachine) -> Self {
        Self { machine }
    }
}

#[async_trait::async_trait]
impl StartPomodoroPort for StartPomodoroService {
    async fn start_pomodoro(&self) {
        self.machine.start_pomodoro();
    }
}

pub struct StartBreakService {
    machine: TimerMachine,
}

impl StartBreakService {
    pub fn new(machine: TimerMachine) -> Self {
        Self { machine }
    }
}

#[async_trait::async_trait]
impl StartBreakPort for StartBreakService {
    async fn start_break(&self) {
        self.machine.start_break();
    }
}

pub struct StopService {
    machine: TimerMachine,
}

impl StopService {
    pub fn new(machine: TimerMachine) -> Self {
        Self { machine }
    }
}

#[async_trait::async_trait]
impl StopPort for StopService {
    async fn stop(&self) {
        self.machine.shutdown();
    }
}

pub struct QueryService {
    machine: TimerMachine,
}

impl QueryService {
    pub fn new(machine: TimerMachine) -> Self {
        Self { machine }
    }
}

#[async_trait::async_trait]
impl QueryPort for QueryService {
    async fn query(&self) -> QueryResponse {
        let TimerSnapshot {
            state,
            total,
            remaining,
        } = self.machine.snapshot();
        QueryResponse {
            state: state.to_string(),
            total,
            remaining,
        }
    }
}

pub struct TitleService {
    board: Arc<TitleBoard>,
}

impl TitleService {
    pub fn new(board: Arc<TitleBoard>) -> Self {
        Self { board }
    }
}

#[async_trait::async_trait]
impl TitlePort for TitleService {
    async fn title(&self) -> Option<String> {
        self.board.current()
    }
}

pub struct ShutdownService {
    machine: TimerMachine,
    updater: Mutex<Option<UpdaterHandle>>,
}

impl ShutdownService {
    pub fn new(machine: TimerMachine, updater: UpdaterHandle) -> Self {
        Self {
            machine,
            updater: Mutex::new(Some(updater)),
        }
    }
}

#[async_trait::async_trait]
impl ShutdownPort for ShutdownService {
    async fn shutdown(&self) {
        self.machine.shutdown();
        if let Some(updater) = self.updater.lock().await.take() {
            updater.stop().await;
        }
    }
}
