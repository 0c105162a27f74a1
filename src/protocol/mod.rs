//! Wire protocol between the client and the daemon.
//!
//! Every connection carries exactly one [`Request`] followed by one
//! [`Response`], each wrapped in a length-prefixed [`Frame`].

pub mod connection;
pub mod data;
pub mod frame;

pub use connection::Connection;
pub use data::{Protocol, Request, Response};
pub use frame::{Frame, ParseFrameError, WriteFrameError};
