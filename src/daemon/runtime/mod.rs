mod environment;
mod process;

pub use environment::{Environment, SetupEnvironmentError};
pub use process::{ControlProcessError, ProcessController};
