use std::fmt::Display;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use snafu::{prelude::*, IntoError};
use tokio::io::DuplexStream;
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::utils::stream::Stream;

/// Abstract listener which listens on a given endpoint and accepts connections.
#[async_trait::async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Accept connections and return its corresponding stream.
    ///
    /// # Errors
    ///
    /// This function will return an error if the connection fails to establish.
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError>;
}

/// An error for listening procedure.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum ListenError {
    #[snafu(display("Could not bind to occupied endpoint {endpoint}"))]
    InUse { endpoint: String },
    #[snafu(display("Could not bind to {endpoint}"))]
    Bind {
        endpoint: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Could not accept connection due to system error"))]
    Accept {
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
    #[snafu(display("Listener has no peer left"))]
    Closed,
}

fn bind_error(err: IoError, endpoint: impl Display) -> ListenError {
    let endpoint = endpoint.to_string();
    match err.kind() {
        IoErrorKind::AddrInUse => ListenError::InUse { endpoint },
        _ => BindSnafu { endpoint }.into_error(err),
    }
}

/// Bind a UNIX socket at `path`.
///
/// # Errors
///
/// This function will return an error if the path is taken or binding fails.
pub fn bind_unix<P: AsRef<Path>>(path: P) -> Result<UnixListener, ListenError> {
    let path = path.as_ref();
    UnixListener::bind(path).map_err(|err| bind_error(err, path.display()))
}

/// Bind a TCP socket at `address`.
///
/// # Errors
///
/// This function will return an error if the address is taken or binding
/// fails.
pub async fn bind_tcp(address: SocketAddr) -> Result<TcpListener, ListenError> {
    TcpListener::bind(address)
        .await
        .map_err(|err| bind_error(err, address))
}

#[async_trait::async_trait]
impl Listener for UnixListener {
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError> {
        let (stream, _) = UnixListener::accept(self).await.context(AcceptSnafu)?;
        Ok(Box::new(stream))
    }
}

#[async_trait::async_trait]
impl Listener for TcpListener {
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError> {
        let (stream, peer) = TcpListener::accept(self).await.context(AcceptSnafu)?;
        tracing::debug!(%peer, "Accepted TCP connection");
        Ok(Box::new(stream))
    }
}

/// A [`Listener`] which hands the other end of every accepted
/// [`DuplexStream`] to a channel. Used for in-memory tests.
#[derive(Debug)]
pub struct DuplexListener {
    peers: Sender<DuplexStream>,
    buffer_size: usize,
}

impl DuplexListener {
    /// Creates a [`DuplexListener`] and the receiver of client ends.
    pub fn new(buffer_size: usize) -> (Self, Receiver<DuplexStream>) {
        let (peers, receiver) = mpsc::channel(1);
        (Self { peers, buffer_size }, receiver)
    }
}

#[async_trait::async_trait]
impl Listener for DuplexListener {
    async fn accept(&self) -> Result<Box<dyn Stream>, ListenError> {
        let (local, peer) = tokio::io::duplex(self.buffer_size);
        self.peers.send(peer).await.map_err(|_| ListenError::Closed)?;
        Ok(Box::new(local))
    }
}
