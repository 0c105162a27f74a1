//! A small static file server.
//!
//! Only the path convention of the tray's web view is implemented: anything
//! under `/api/` is reserved and answered with 404, `/` maps to `index.html`
//! and every other path is looked up under a root directory.

mod files;
mod request;
mod server;

pub use files::StaticFiles;
pub use request::{ParseHeadError, RequestHead, MAX_HEAD_LENGTH};
pub use server::{WebServer, WebServerError};
