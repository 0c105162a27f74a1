pub mod app;
pub mod config;
pub mod outbound;
pub mod repository;
pub mod runtime;
pub mod web;

pub use app::{Server, ServerError};
pub use runtime::{ControlProcessError, ProcessController};
