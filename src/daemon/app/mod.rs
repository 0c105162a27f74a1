pub mod listener;
mod server;

pub use listener::{bind_tcp, bind_unix, DuplexListener, ListenError, Listener};
pub use server::{Server, ServerError};
