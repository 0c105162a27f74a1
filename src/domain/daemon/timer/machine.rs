use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot::{self, Receiver, Sender};
use tokio::time::{Duration, Instant};

use crate::domain::entity::TimerState;

/// Callback invoked after every state transition.
pub type StateObserver = Arc<dyn Fn(TimerState) + Send + Sync>;

/// Durations of both timer phases, fixed when the [`TimerMachine`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub pomodoro_duration: Duration,
    pub break_duration: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pomodoro_duration: Duration::from_secs(25 * 60),
            break_duration: Duration::from_secs(5 * 60),
        }
    }
}

/// A consistent view of the timer taken under one lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub total: Duration,
    pub remaining: Duration,
}

/// The pomodoro state machine. Cloning it yields another handle to the same
/// session.
///
/// Every `start_*` call spawns a countdown on the current tokio runtime, so
/// the machine must be driven from inside one.
#[derive(Clone)]
pub struct TimerMachine {
    shared: Arc<Shared>,
}

struct Shared {
    config: TimerConfig,
    session: Mutex<TimerSession>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct TimerSession {
    state: TimerState,
    countdown: Option<Countdown>,
    observer: Option<StateObserver>,
    issued: u64,
}

impl TimerSession {
    /// Cancel the in-flight countdown, if any. The countdown task wakes up on
    /// the cancel signal and exits without touching the session.
    fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            let _ = countdown.cancel.send(());
        }
    }
}

struct Countdown {
    id: u64,
    deadline: Instant,
    total: Duration,
    cancel: Sender<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pomodoro,
    Break,
}

impl Phase {
    fn state(self) -> TimerState {
        match self {
            Self::Pomodoro => TimerState::PomodoroRunning,
            Self::Break => TimerState::BreakRunning,
        }
    }

    fn duration(self, config: &TimerConfig) -> Duration {
        match self {
            Self::Pomodoro => config.pomodoro_duration,
            Self::Break => config.break_duration,
        }
    }
}

impl TimerMachine {
    /// Creates a new [`TimerMachine`] in [`TimerState::Idle`].
    pub fn new(config: TimerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                session: Mutex::new(TimerSession::default()),
            }),
        }
    }

    /// Start a pomodoro countdown. Does nothing if a pomodoro is already
    /// running or the duration cannot be scheduled; a running break is
    /// cancelled.
    pub fn start_pomodoro(&self) {
        self.start(Phase::Pomodoro);
    }

    /// Start a break countdown. Does nothing if a break is already running; a
    /// running pomodoro is cancelled.
    pub fn start_break(&self) {
        self.start(Phase::Break);
    }

    /// Cancel any countdown and go back to [`TimerState::Idle`]. The observer
    /// is notified even if the machine was idle already.
    pub fn shutdown(&self) {
        let observer = {
            let mut session = self.shared.lock();
            session.cancel_countdown();
            session.state = TimerState::Idle;
            session.observer.clone()
        };

        tracing::info!(state = %TimerState::Idle, "Timer shut down");

        if let Some(observer) = observer {
            observer(TimerState::Idle);
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> TimerState {
        self.shared.lock().state
    }

    /// Returns the time left until the running countdown elapses, or zero if
    /// the machine is idle.
    pub fn remaining(&self) -> Duration {
        self.snapshot().remaining
    }

    /// Returns state, phase length and remaining time together.
    pub fn snapshot(&self) -> TimerSnapshot {
        let session = self.shared.lock();
        match (&session.countdown, session.state.is_running()) {
            (Some(countdown), true) => TimerSnapshot {
                state: session.state,
                total: countdown.total,
                remaining: countdown
                    .deadline
                    .saturating_duration_since(Instant::now()),
            },
            _ => TimerSnapshot {
                state: session.state,
                total: Duration::ZERO,
                remaining: Duration::ZERO,
            },
        }
    }

    /// Register the observer, replacing the previous one.
    pub fn on_state_change<F>(&self, observer: F)
    where
        F: Fn(TimerState) + Send + Sync + 'static,
    {
        self.shared.lock().observer = Some(Arc::new(observer));
    }

    fn start(&self, phase: Phase) {
        let state = phase.state();
        let duration = phase.duration(&self.shared.config);

        let (id, cancelled, observer) = {
            let mut session = self.shared.lock();
            if session.state == state {
                tracing::debug!(%state, "Timer already running, ignored");
                return;
            }

            // Checked before any mutation so the session is left untouched.
            let Some(deadline) = Instant::now().checked_add(duration) else {
                tracing::warn!(%state, ?duration, "Timer duration out of range, ignored");
                return;
            };

            session.cancel_countdown();

            let (cancel, cancelled) = oneshot::channel();
            session.issued += 1;
            let id = session.issued;
            session.countdown = Some(Countdown {
                id,
                deadline,
                total: duration,
                cancel,
            });
            session.state = state;

            (id, cancelled, session.observer.clone())
        };

        tracing::info!(%state, ?duration, "Timer started");

        if let Some(observer) = observer {
            observer(state);
        }

        tokio::spawn(countdown(Arc::clone(&self.shared), id, duration, cancelled));
    }
}

/// Wait for `duration` unless cancelled first. On elapse the session goes
/// back to idle, provided this countdown is still the installed one.
async fn countdown(shared: Arc<Shared>, id: u64, duration: Duration, cancelled: Receiver<()>) {
    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = cancelled => return,
    }

    let observer = {
        let mut session = shared.lock();
        if !matches!(&session.countdown, Some(countdown) if countdown.id == id) {
            return;
        }
        session.countdown = None;
        session.state = TimerState::Idle;
        session.observer.clone()
    };

    tracing::info!(state = %TimerState::Idle, "Timer elapsed");

    if let Some(observer) = observer {
        observer(TimerState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POMODORO: Duration = Duration::from_secs(25 * 60);
    const BREAK: Duration = Duration::from_secs(5 * 60);

    #[tokio::test(start_paused = true)]
    async fn start_pomodoro_from_idle() {
        let (machine, events) = new_machine();
        assert_eq!(machine.state(), TimerState::Idle);

        machine.start_pomodoro();

        assert_eq!(machine.state(), TimerState::PomodoroRunning);
        assert_eq!(*events.lock().unwrap(), [TimerState::PomodoroRunning]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_pomodoro_twice_is_noop() {
        let (machine, events) = new_machine();
        machine.start_pomodoro();
        tokio::time::sleep(Duration::from_secs(60)).await;
        machine.start_pomodoro();

        assert_eq!(*events.lock().unwrap(), [TimerState::PomodoroRunning]);
        // The first countdown keeps running, no new one was installed.
        assert_eq!(machine.remaining(), POMODORO - Duration::from_secs(60));

        tokio::time::sleep(POMODORO).await;
        assert_eq!(
            *events.lock().unwrap(),
            [TimerState::PomodoroRunning, TimerState::Idle]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn start_break_cancels_pomodoro() {
        let (machine, events) = new_machine();
        machine.start_pomodoro();
        tokio::time::sleep(POMODORO - Duration::from_secs(1)).await;
        machine.start_break();

        // Past the point where the pomodoro would have elapsed.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(machine.state(), TimerState::BreakRunning);
        assert_eq!(
            *events.lock().unwrap(),
            [TimerState::PomodoroRunning, TimerState::BreakRunning]
        );

        tokio::time::sleep(BREAK).await;
        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(
            *events.lock().unwrap(),
            [
                TimerState::PomodoroRunning,
                TimerState::BreakRunning,
                TimerState::Idle
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_elapses_to_idle() {
        let (machine, events) = new_machine();
        machine.start_break();
        tokio::time::sleep(BREAK + Duration::from_secs(1)).await;

        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(machine.remaining(), Duration::ZERO);
        assert_eq!(
            *events.lock().unwrap(),
            [TimerState::BreakRunning, TimerState::Idle]
        );

        tokio::time::sleep(POMODORO).await;
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_countdown() {
        let (machine, events) = new_machine();
        machine.start_pomodoro();
        machine.shutdown();

        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(
            *events.lock().unwrap(),
            [TimerState::PomodoroRunning, TimerState::Idle]
        );

        tokio::time::sleep(POMODORO * 2).await;
        assert_eq!(
            *events.lock().unwrap(),
            [TimerState::PomodoroRunning, TimerState::Idle]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_while_idle_notifies() {
        let (machine, events) = new_machine();
        machine.shutdown();
        assert_eq!(*events.lock().unwrap(), [TimerState::Idle]);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_shutdown() {
        let (machine, events) = new_machine();
        machine.start_pomodoro();
        tokio::time::sleep(Duration::from_secs(10)).await;
        machine.shutdown();
        machine.start_pomodoro();

        tokio::time::sleep(POMODORO - Duration::from_secs(5)).await;
        assert_eq!(machine.state(), TimerState::PomodoroRunning);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(
            *events.lock().unwrap(),
            [
                TimerState::PomodoroRunning,
                TimerState::Idle,
                TimerState::PomodoroRunning,
                TimerState::Idle
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_and_snapshot() {
        let (machine, _) = new_machine();
        assert_eq!(
            machine.snapshot(),
            TimerSnapshot {
                state: TimerState::Idle,
                total: Duration::ZERO,
                remaining: Duration::ZERO,
            }
        );

        machine.start_pomodoro();
        assert_eq!(machine.remaining(), POMODORO);

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(
            machine.snapshot(),
            TimerSnapshot {
                state: TimerState::PomodoroRunning,
                total: POMODORO,
                remaining: POMODORO - Duration::from_secs(90),
            }
        );

        machine.shutdown();
        assert_eq!(machine.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn observer_may_query_state() {
        let machine = TimerMachine::new(TimerConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = machine.clone();
        let sink = Arc::clone(&seen);
        machine.on_state_change(move |state| {
            sink.lock().unwrap().push((state, inner.state()));
        });

        machine.start_break();
        assert_eq!(
            *seen.lock().unwrap(),
            [(TimerState::BreakRunning, TimerState::BreakRunning)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn observer_is_replaced() {
        let (machine, first) = new_machine();
        let second = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&second);
        machine.on_state_change(move |state| sink.lock().unwrap().push(state));

        machine.start_pomodoro();
        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), [TimerState::PomodoroRunning]);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_break() {
        let (machine, events) = new_machine();
        machine.start_break();
        tokio::time::sleep(Duration::from_secs(30)).await;
        machine.shutdown();
        assert_eq!(machine.state(), TimerState::Idle);

        tokio::time::sleep(BREAK * 2).await;
        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(
            *events.lock().unwrap(),
            [TimerState::BreakRunning, TimerState::Idle]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn start_break_at_pomodoro_deadline() {
        // Either the pomodoro elapses first or the break supersedes it. Both
        // orders end in one break followed by exactly one idle.
        for _ in 0..16 {
            let (machine, events) = new_machine();
            machine.start_pomodoro();
            tokio::time::sleep(POMODORO).await;
            machine.start_break();
            assert_eq!(machine.state(), TimerState::BreakRunning);

            tokio::time::sleep(BREAK + Duration::from_secs(1)).await;
            assert_eq!(machine.state(), TimerState::Idle);

            let events = events.lock().unwrap().clone();
            let elapsed_first = [
                TimerState::PomodoroRunning,
                TimerState::Idle,
                TimerState::BreakRunning,
                TimerState::Idle,
            ];
            let superseded = [
                TimerState::PomodoroRunning,
                TimerState::BreakRunning,
                TimerState::Idle,
            ];
            assert!(
                events == elapsed_first || events == superseded,
                "unexpected transitions {events:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_with_unschedulable_duration_is_ignored() {
        let machine = TimerMachine::new(TimerConfig {
            pomodoro_duration: Duration::MAX,
            break_duration: BREAK,
        });
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        machine.on_state_change(move |state| sink.lock().unwrap().push(state));

        machine.start_break();
        machine.start_pomodoro();
        assert_eq!(machine.state(), TimerState::BreakRunning);

        // The break countdown survived and still elapses.
        tokio::time::sleep(BREAK + Duration::from_secs(1)).await;
        assert_eq!(machine.state(), TimerState::Idle);
        assert_eq!(
            *events.lock().unwrap(),
            [TimerState::BreakRunning, TimerState::Idle]
        );
    }

    fn new_machine() -> (TimerMachine, Arc<Mutex<Vec<TimerState>>>) {
        let machine = TimerMachine::new(TimerConfig::default());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        machine.on_state_change(move |state| sink.lock().unwrap().push(state));
        (machine, events)
    }
}
