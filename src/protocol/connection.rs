use std::sync::Arc;

use bytes::{Buf, BytesMut};
use snafu::prelude::*;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, Error};

use crate::protocol::frame::{Frame, ParseFrameError, WriteFrameError};

/// Frame-level access to a byte stream, usually a socket. Reads are buffered
/// so a frame may arrive in any number of chunks.
pub struct Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream: S,
    read_buffer: BytesMut,
    write_buffer: BytesMut,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Serialize a [`Frame`] and send it through the wrapped stream. The
    /// stream is flushed before returning.
    ///
    /// # Errors
    ///
    /// This function will return an error if serialization fails or network
    /// IO fails.
    pub async fn send(&mut self, frame: Frame) -> Result<(), SendFrameError> {
        self.write_buffer.clear();
        frame.write(&mut self.write_buffer).context(EncodeSnafu)?;

        self.stream
            .write_all(&self.write_buffer)
            .await
            .context(TransmitSnafu)?;
        self.stream.flush().await.context(TransmitSnafu)
    }

    /// Wait until a whole [`Frame`] is buffered and return it. Bytes after the
    /// frame stay buffered for the next call.
    ///
    /// # Errors
    ///
    /// This function will return an error if deserialization fails, the peer
    /// closes the stream or network IO fails.
    pub async fn receive(&mut self) -> Result<Frame, ReceiveFrameError> {
        loop {
            if let Some(frame) = self.parse_buffered()? {
                return Ok(frame);
            }

            let read = self
                .stream
                .read_buf(&mut self.read_buffer)
                .await
                .context(ReceiveSnafu)?;

            if read == 0 {
                return match self.read_buffer.len() {
                    0 => ClosedSnafu.fail(),
                    buffered => TruncatedSnafu { buffered }.fail(),
                };
            }
        }
    }

    fn parse_buffered(&mut self) -> Result<Option<Frame>, ReceiveFrameError> {
        match Frame::parse(&self.read_buffer[..]) {
            Ok((frame, len)) => {
                self.read_buffer.advance(len);
                Ok(Some(frame))
            }
            Err(ParseFrameError::Incomplete) => Ok(None),
            Err(err) => Err(err).context(DecodeSnafu),
        }
    }
}

impl<S> From<S> for Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn from(value: S) -> Self {
        Self {
            stream: value,
            read_buffer: BytesMut::with_capacity(1024),
            write_buffer: BytesMut::with_capacity(256),
        }
    }
}

/// An error type for [`Connection::send`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SendFrameError {
    #[snafu(display("Could not encode frame"))]
    Encode { source: WriteFrameError },
    #[snafu(display("Could not write frame to the stream"))]
    Transmit {
        #[snafu(source(from(Error, Arc::new)))]
        source: Arc<Error>,
    },
}

/// An error type for [`Connection::receive`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReceiveFrameError {
    #[snafu(display("Could not decode frame"))]
    Decode { source: ParseFrameError },
    #[snafu(display("Connection is closed by the peer"))]
    Closed,
    #[snafu(display("Connection is closed with {buffered} bytes of a partial frame"))]
    Truncated { buffered: usize },
    #[snafu(display("Could not read from the stream"))]
    Receive {
        #[snafu(source(from(Error, Arc::new)))]
        source: Arc<Error>,
    },
}
