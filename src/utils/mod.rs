pub mod signal;
pub mod stream;
pub mod tracing;
pub mod xdg;
