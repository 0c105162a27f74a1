use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::domain::daemon::outbound::DisplayPort;
use crate::domain::daemon::updater::state::UpdaterState;
use crate::domain::daemon::updater::ticker::TickSource;
use crate::domain::daemon::updater::{minutes_title, TimerSource, UpdaterHandle};
use crate::domain::entity::TimerState;

/// A [`UpdaterContext`] stores all objects relavent to the [`UpdaterRoutine`].
pub struct UpdaterContext {
    pub source: Arc<dyn TimerSource>,
    pub display: Arc<dyn DisplayPort>,
    pub ticks: Arc<dyn TickSource>,
    pub period: Duration,
    pub changes: watch::Receiver<Option<TimerState>>,
    pub shutdown: oneshot::Receiver<()>,
}

impl UpdaterContext {
    /// Query the remaining time and show it as the title.
    pub fn show_remaining(&self) {
        let title = minutes_title(self.source.remaining());
        tracing::debug!(%title, "Updating title");
        self.display.set_title(&title);
    }
}

/// A type that keeps the title in sync with the timer. It runs on
/// background until its [`UpdaterHandle`] stops it.
pub struct UpdaterRoutine {
    context: UpdaterContext,
    state: UpdaterState,
}

impl UpdaterRoutine {
    /// Subscribe to `source` and spawn a running [`UpdaterRoutine`] on
    /// background.
    pub fn spawn(
        source: Arc<dyn TimerSource>,
        display: Arc<dyn DisplayPort>,
        ticks: Arc<dyn TickSource>,
        period: Duration,
    ) -> UpdaterHandle {
        // Single-slot mailbox: a newer state overwrites an unconsumed one.
        let (relay, changes) = watch::channel(None);
        source.on_state_change(Arc::new(move |state: TimerState| {
            relay.send_replace(Some(state));
        }));

        let (stop, shutdown) = oneshot::channel();
        let handle: JoinHandle<()> = tokio::spawn(async move {
            let mut routine = Self {
                context: UpdaterContext {
                    source,
                    display,
                    ticks,
                    period,
                    changes,
                    shutdown,
                },
                state: UpdaterState::new(),
            };
            routine.run().await;
        });

        UpdaterHandle::new(stop, handle)
    }

    async fn run(&mut self) {
        while !self.state.is_stopped() {
            self.state.run(&mut self.context).await;
        }
        tracing::debug!("Title updater stopped");
    }
}
