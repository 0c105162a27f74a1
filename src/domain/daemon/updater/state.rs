use crate::domain::daemon::updater::routine::UpdaterContext;
use crate::domain::daemon::updater::ticker::Ticks;

#[derive(Debug)]
#[repr(transparent)]
pub struct UpdaterState {
    inner: Option<UpdaterStateInner>,
}

impl UpdaterState {
    /// Creates a new [`UpdaterState`].
    pub fn new() -> Self {
        Self {
            inner: Some(UpdaterStateInner::Idle(IdleState)),
        }
    }

    /// Wait for the next event and react to it based on the inner state.
    pub async fn run(&mut self, context: &mut UpdaterContext) {
        self.inner = match self.inner.take() {
            Some(inner) => Some(inner.run(context).await),
            None => unreachable!("`UpdaterState`'s inner should not be `None`"),
        };
    }

    /// Returns `true` if is stopped of this [`UpdaterState`].
    pub fn is_stopped(&self) -> bool {
        matches!(self.inner, Some(UpdaterStateInner::Stopped(_)))
    }
}

#[enum_dispatch::enum_dispatch]
trait StateRun {
    async fn run(self, context: &mut UpdaterContext) -> UpdaterStateInner;
}

#[derive(Debug)]
#[enum_dispatch::enum_dispatch(StateRun)]
enum UpdaterStateInner {
    Idle(IdleState),
    Running(RunningState),
    Stopped(StoppedState),
}

/// No phase is running and no title is shown.
#[derive(Debug)]
struct IdleState;

impl StateRun for IdleState {
    async fn run(self, context: &mut UpdaterContext) -> UpdaterStateInner {
        tokio::select! {
            _ = &mut context.shutdown => StoppedState.into(),
            changed = context.changes.changed() => match changed {
                Ok(()) => transition(context, None),
                Err(_) => StoppedState.into(),
            },
        }
    }
}

/// A phase is running; the title is refreshed on every tick.
#[derive(Debug)]
struct RunningState {
    ticks: Ticks,
}

impl StateRun for RunningState {
    async fn run(mut self, context: &mut UpdaterContext) -> UpdaterStateInner {
        tokio::select! {
            _ = &mut context.shutdown => self.handle_stop(context),
            changed = context.changes.changed() => match changed {
                Ok(()) => transition(context, Some(self.ticks)),
                Err(_) => self.handle_stop(context),
            },
            Some(_) = self.ticks.recv() => self.handle_tick(context),
        }
    }
}

impl RunningState {
    fn handle_tick(self, context: &mut UpdaterContext) -> UpdaterStateInner {
        context.show_remaining();
        self.into()
    }

    fn handle_stop(self, context: &mut UpdaterContext) -> UpdaterStateInner {
        self.ticks.stop();
        context.display.clear_title();
        StoppedState.into()
    }
}

/// The updater has been cancelled.
#[derive(Debug)]
struct StoppedState;

impl StateRun for StoppedState {
    async fn run(self, _context: &mut UpdaterContext) -> UpdaterStateInner {
        self.into()
    }
}

/// React to the latest state published by the timer.
fn transition(context: &mut UpdaterContext, ticks: Option<Ticks>) -> UpdaterStateInner {
    let observed = *context.changes.borrow_and_update();
    match (observed, ticks) {
        (Some(state), ticks) if state.is_running() => {
            // Restart so the first refresh is a full period after the new
            // phase began.
            if let Some(ticks) = ticks {
                ticks.stop();
            }
            let ticks = context.ticks.start(context.period);
            tracing::debug!(%state, "Phase started, refreshing title");
            context.show_remaining();
            RunningState { ticks }.into()
        }
        (Some(_), Some(ticks)) => {
            ticks.stop();
            tracing::debug!("Timer went idle, clearing title");
            context.display.clear_title();
            IdleState.into()
        }
        (None, Some(ticks)) => RunningState { ticks }.into(),
        (_, None) => IdleState.into(),
    }
}
