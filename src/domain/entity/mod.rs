pub mod duration;
pub mod state;

pub use duration::PhaseDuration;
pub use state::TimerState;
