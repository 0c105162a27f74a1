pub mod inbound;
pub mod outbound;
pub mod timer;
pub mod updater;

mod app;

pub use app::{ApplicationCore, SetupApplicationCoreError, TitleBoard};
