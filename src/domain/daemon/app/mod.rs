mod board;
mod core;
mod service;

pub use board::TitleBoard;
pub use self::core::{ApplicationCore, SetupApplicationCoreError};
