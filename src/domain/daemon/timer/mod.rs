mod machine;

pub use machine::{StateObserver, TimerConfig, TimerMachine, TimerSnapshot};
