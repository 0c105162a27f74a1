use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::{prelude::*, IntoError};
use tokio::io::DuplexStream;
use tokio::net::UnixStream;
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::utils::stream::Stream;

/// Opens a stream to the daemon.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns [`ConnectError::Unavailable`] when nothing is listening.
    async fn connect(&self) -> Result<Box<dyn Stream>, ConnectError>;
}

/// An error while connecting to the daemon.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum ConnectError {
    #[snafu(display("Endpoint {endpoint} is unavailable"))]
    Unavailable { endpoint: String },
    #[snafu(display("Could not connect to endpoint"))]
    System {
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}

fn connect_error(err: IoError, endpoint: &Path) -> ConnectError {
    match err.kind() {
        // A socket file nobody listens on is what a crashed daemon leaves.
        IoErrorKind::NotFound | IoErrorKind::ConnectionRefused => ConnectError::Unavailable {
            endpoint: endpoint.display().to_string(),
        },
        _ => SystemSnafu.into_error(err),
    }
}

/// Connects to the daemon socket at a fixed path.
#[derive(Debug, Clone)]
pub struct UnixConnector {
    path: PathBuf,
}

impl UnixConnector {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Connector for UnixConnector {
    async fn connect(&self) -> Result<Box<dyn Stream>, ConnectError> {
        let stream = UnixStream::connect(&self.path)
            .await
            .map_err(|err| connect_error(err, &self.path))?;
        Ok(Box::new(stream))
    }
}

/// A [`Connector`] which hands the far end of each in-memory stream to a
/// channel, for tests.
#[derive(Debug, Clone)]
pub struct DuplexConnector {
    peers: Sender<DuplexStream>,
    buffer_size: usize,
}

impl DuplexConnector {
    /// Creates a [`DuplexConnector`] and the receiver of server ends.
    pub fn new(buffer_size: usize) -> (Self, Receiver<DuplexStream>) {
        let (peers, receiver) = mpsc::channel(1);
        (Self { peers, buffer_size }, receiver)
    }
}

#[async_trait::async_trait]
impl Connector for DuplexConnector {
    async fn connect(&self) -> Result<Box<dyn Stream>, ConnectError> {
        let (local, peer) = tokio::io::duplex(self.buffer_size);
        if self.peers.send(peer).await.is_err() {
            return UnavailableSnafu {
                endpoint: "<memory>",
            }
            .fail();
        }
        Ok(Box::new(local))
    }
}
