//! Keeps a display title in sync with the timer.
//!
//! The updater subscribes to state changes through a single-slot mailbox, so
//! it may skip intermediate states but always ends up seeing the latest one.
//! While a phase runs, it shows the remaining whole minutes (`"24m"`) and
//! refreshes them on every tick; when the timer goes idle, or the updater is
//! stopped while a phase runs, the title is cleared.

mod routine;
mod state;
mod ticker;

pub use routine::UpdaterRoutine;
pub use ticker::{IntervalTicks, TickSource, Ticks};

use tokio::sync::oneshot::Sender;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::domain::daemon::timer::{StateObserver, TimerMachine};

/// The part of the timer the updater depends on.
pub trait TimerSource: Send + Sync + 'static {
    /// Register `observer` as the timer's sole state-change observer.
    fn on_state_change(&self, observer: StateObserver);

    /// Returns the time left in the running phase.
    fn remaining(&self) -> Duration;
}

impl TimerSource for TimerMachine {
    fn on_state_change(&self, observer: StateObserver) {
        TimerMachine::on_state_change(self, move |state| observer(state));
    }

    fn remaining(&self) -> Duration {
        TimerMachine::remaining(self)
    }
}

/// Handle that stops a running [`UpdaterRoutine`].
#[derive(Debug)]
pub struct UpdaterHandle {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl UpdaterHandle {
    fn new(stop: Sender<()>, handle: JoinHandle<()>) -> Self {
        Self { stop, handle }
    }

    /// Cancel the updater and wait for it to finish. A shown title is
    /// cleared before it returns.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(err) = self.handle.await {
            tracing::error!(err = %err, "Title updater terminated abnormally");
        }
    }
}

/// Format `remaining` as whole minutes, rounded down.
pub fn minutes_title(remaining: Duration) -> String {
    format!("{}m", remaining.as_secs() / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
    use tokio::time::Instant;

    use crate::domain::daemon::outbound::DisplayPort;
    use crate::domain::daemon::timer::TimerConfig;
    use crate::domain::entity::TimerState;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn minutes_title_rounds_down() {
        assert_eq!(minutes_title(Duration::ZERO), "0m");
        assert_eq!(minutes_title(Duration::from_secs(59)), "0m");
        assert_eq!(minutes_title(MINUTE * 5), "5m");
        assert_eq!(minutes_title(MINUTE * 25 - Duration::from_millis(1)), "24m");
    }

    #[tokio::test]
    async fn updater_follows_state_and_ticks() {
        let (timer, ticks, mut shown, handle) = spawn_updater();

        timer.set_remaining(MINUTE * 5);
        timer.fire(TimerState::PomodoroRunning);
        assert_eq!(shown.recv().await, Some(Shown::Title("5m".to_owned())));

        timer.set_remaining(MINUTE * 4);
        ticks.tick().await;
        assert_eq!(shown.recv().await, Some(Shown::Title("4m".to_owned())));

        timer.fire(TimerState::Idle);
        assert_eq!(shown.recv().await, Some(Shown::Clear));
        assert_eq!(ticks.stopped(), 1);

        handle.stop().await;
        assert_eq!(shown.recv().await, None);
    }

    #[tokio::test]
    async fn updater_restarts_ticks_on_new_phase() {
        let (timer, ticks, mut shown, handle) = spawn_updater();

        timer.set_remaining(MINUTE * 25);
        timer.fire(TimerState::PomodoroRunning);
        assert_eq!(shown.recv().await, Some(Shown::Title("25m".to_owned())));

        timer.set_remaining(MINUTE * 5);
        timer.fire(TimerState::BreakRunning);
        assert_eq!(shown.recv().await, Some(Shown::Title("5m".to_owned())));
        assert_eq!(ticks.started(), 2);
        assert_eq!(ticks.stopped(), 1);

        handle.stop().await;
        assert_eq!(shown.recv().await, Some(Shown::Clear));
        assert_eq!(shown.recv().await, None);
        assert_eq!(ticks.stopped(), 2);
    }

    #[tokio::test]
    async fn updater_ignores_idle_while_idle() {
        let (timer, ticks, mut shown, handle) = spawn_updater();

        timer.fire(TimerState::Idle);
        tokio::task::yield_now().await;

        timer.set_remaining(MINUTE * 3);
        timer.fire(TimerState::BreakRunning);
        assert_eq!(shown.recv().await, Some(Shown::Title("3m".to_owned())));
        assert_eq!(ticks.started(), 1);

        handle.stop().await;
        assert_eq!(shown.recv().await, Some(Shown::Clear));
    }

    #[tokio::test]
    async fn updater_keeps_only_latest_state() {
        let (timer, ticks, mut shown, handle) = spawn_updater();

        // The updater task has not run yet, so these overwrite each other.
        timer.set_remaining(MINUTE * 7);
        timer.fire(TimerState::PomodoroRunning);
        timer.fire(TimerState::Idle);
        timer.fire(TimerState::BreakRunning);

        assert_eq!(shown.recv().await, Some(Shown::Title("7m".to_owned())));
        assert_eq!(ticks.started(), 1);

        handle.stop().await;
        assert_eq!(shown.recv().await, Some(Shown::Clear));
        assert_eq!(shown.recv().await, None);
    }

    #[tokio::test]
    async fn updater_stop_while_idle_keeps_title_untouched() {
        let (_, _, mut shown, handle) = spawn_updater();
        handle.stop().await;
        assert_eq!(shown.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn updater_drives_title_from_machine() {
        let machine = TimerMachine::new(TimerConfig::default());
        let (display, mut shown) = RecordingDisplay::new();
        let handle = UpdaterRoutine::spawn(
            Arc::new(machine.clone()),
            display,
            Arc::new(IntervalTicks),
            Duration::from_secs(10),
        );

        machine.start_pomodoro();
        assert_eq!(shown.recv().await, Some(Shown::Title("25m".to_owned())));
        assert_eq!(shown.recv().await, Some(Shown::Title("24m".to_owned())));

        machine.shutdown();
        assert_eq!(shown.recv().await, Some(Shown::Clear));

        handle.stop().await;
        assert_eq!(shown.recv().await, None);
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Shown {
        Title(String),
        Clear,
    }

    struct RecordingDisplay {
        sender: UnboundedSender<Shown>,
    }

    impl RecordingDisplay {
        fn new() -> (Arc<dyn DisplayPort>, UnboundedReceiver<Shown>) {
            let (sender, receiver) = mpsc::unbounded_channel();
            (Arc::new(Self { sender }), receiver)
        }
    }

    impl DisplayPort for RecordingDisplay {
        fn set_title(&self, text: &str) {
            let _ = self.sender.send(Shown::Title(text.to_owned()));
        }

        fn clear_title(&self) {
            let _ = self.sender.send(Shown::Clear);
        }
    }

    #[derive(Default)]
    struct FakeTimer {
        observer: Mutex<Option<StateObserver>>,
        remaining: Mutex<Duration>,
    }

    impl FakeTimer {
        fn fire(&self, state: TimerState) {
            let observer = self.observer.lock().unwrap().clone();
            observer.expect("Updater should have subscribed")(state);
        }

        fn set_remaining(&self, remaining: Duration) {
            *self.remaining.lock().unwrap() = remaining;
        }
    }

    impl TimerSource for FakeTimer {
        fn on_state_change(&self, observer: StateObserver) {
            *self.observer.lock().unwrap() = Some(observer);
        }

        fn remaining(&self) -> Duration {
            *self.remaining.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct ManualTicks {
        latest: Mutex<Option<mpsc::Sender<Instant>>>,
        started: AtomicUsize,
        stopped: Arc<AtomicUsize>,
    }

    impl ManualTicks {
        async fn tick(&self) {
            let sender = self.latest.lock().unwrap().clone();
            sender
                .expect("A tick source should be running")
                .send(Instant::now())
                .await
                .unwrap();
        }

        fn started(&self) -> usize {
            self.started.load(Ordering::SeqCst)
        }

        fn stopped(&self) -> usize {
            self.stopped.load(Ordering::SeqCst)
        }
    }

    impl TickSource for ManualTicks {
        fn start(&self, _period: Duration) -> Ticks {
            let (sender, receiver) = mpsc::channel(1);
            *self.latest.lock().unwrap() = Some(sender);
            self.started.fetch_add(1, Ordering::SeqCst);
            let stopped = Arc::clone(&self.stopped);
            Ticks::new(receiver, move || {
                stopped.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    fn spawn_updater() -> (
        Arc<FakeTimer>,
        Arc<ManualTicks>,
        UnboundedReceiver<Shown>,
        UpdaterHandle,
    ) {
        let timer = Arc::new(FakeTimer::default());
        let ticks = Arc::new(ManualTicks::default());
        let (display, shown) = RecordingDisplay::new();
        let handle = UpdaterRoutine::spawn(
            Arc::clone(&timer) as Arc<dyn TimerSource>,
            display,
            Arc::clone(&ticks) as Arc<dyn TickSource>,
            Duration::from_secs(10),
        );
        (timer, ticks, shown, handle)
    }
}
