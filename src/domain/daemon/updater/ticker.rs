use tokio::sync::mpsc::{self, Receiver};
use tokio::time::{Duration, Instant, MissedTickBehavior};

/// Factory of repeating tick sources. The updater restarts one every time a
/// phase starts, so implementations must be cheap to start and stop.
pub trait TickSource: Send + Sync + 'static {
    /// Start a source that ticks every `period`, the first tick arriving one
    /// period from now.
    fn start(&self, period: Duration) -> Ticks;
}

/// A running tick source. Stopping it, explicitly or by dropping, ends the
/// stream of ticks.
pub struct Ticks {
    receiver: Receiver<Instant>,
    stopper: Option<Box<dyn FnOnce() + Send>>,
}

impl Ticks {
    /// Creates a new [`Ticks`] fed by `receiver`. `stopper` is run once when
    /// the source is stopped.
    pub fn new<F>(receiver: Receiver<Instant>, stopper: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            receiver,
            stopper: Some(Box::new(stopper)),
        }
    }

    /// Wait for the next tick. Returns `None` once the producer is gone.
    pub async fn recv(&mut self) -> Option<Instant> {
        self.receiver.recv().await
    }

    /// Stop the source.
    pub fn stop(mut self) {
        self.run_stopper();
    }

    fn run_stopper(&mut self) {
        if let Some(stopper) = self.stopper.take() {
            stopper();
        }
    }
}

impl Drop for Ticks {
    fn drop(&mut self) {
        self.run_stopper();
    }
}

impl std::fmt::Debug for Ticks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticks")
            .field("stopped", &self.stopper.is_none())
            .finish()
    }
}

/// A [`TickSource`] backed by [`tokio::time::interval_at`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalTicks;

impl TickSource for IntervalTicks {
    fn start(&self, period: Duration) -> Ticks {
        let (sender, receiver) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let Some(start) = Instant::now().checked_add(period) else {
                tracing::warn!(?period, "Tick period out of range, no ticks");
                return;
            };
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                let now = interval.tick().await;
                if sender.send(now).await.is_err() {
                    break;
                }
            }
        });
        Ticks::new(receiver, move || handle.abort())
    }
}
