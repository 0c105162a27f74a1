use tokio::io::DuplexStream;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};

/// Abstract form of types that are capable of async IO.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl Stream for UnixStream {}

impl Stream for TcpStream {}

impl Stream for DuplexStream {}

impl<T: Stream + ?Sized> Stream for Box<T> {}
