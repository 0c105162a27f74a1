use bytes::{Buf, BufMut};
use serde_json::Error as SerdeError;
use snafu::prelude::*;

use crate::protocol::data::Protocol;

/// The largest payload a [`Frame`] may carry.
pub const MAX_FRAME_LENGTH: usize = 64 * 1024;

const MARKER: u8 = b'+';
const HEADER_LENGTH: usize = 1 + 8;

/// One [`Protocol`] message on the wire.
///
/// Layout: the marker byte `+`, the payload length as a big-endian `u64`, then
/// that many bytes of JSON. Empty payloads and payloads above
/// [`MAX_FRAME_LENGTH`] are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Protocol,
}

impl Frame {
    /// Decode the frame at the front of `buf`, returning it with the number
    /// of bytes it spans. Trailing bytes are left alone.
    ///
    /// # Errors
    ///
    /// [`ParseFrameError::Incomplete`] means more bytes are needed. Every
    /// other variant means the stream is corrupt.
    pub fn parse<B: Buf>(mut buf: B) -> Result<(Self, usize), ParseFrameError> {
        let len = Self::parse_header(&mut buf)?;
        ensure!(buf.remaining() >= len, IncompleteSnafu);

        let data = serde_json::from_reader(buf.take(len).reader()).context(DeserializationSnafu)?;
        Ok((Self { data }, HEADER_LENGTH + len))
    }

    fn parse_header<B: Buf>(buf: &mut B) -> Result<usize, ParseFrameError> {
        ensure!(buf.has_remaining(), IncompleteSnafu);
        let marker = buf.get_u8();
        ensure!(marker == MARKER, InvalidStartSnafu { found: marker });

        ensure!(buf.remaining() >= 8, IncompleteSnafu);
        let len = buf.get_u64();
        usize::try_from(len)
            .ok()
            .filter(|len| (1..=MAX_FRAME_LENGTH).contains(len))
            .context(InvalidLengthSnafu { len })
    }

    /// Append the encoded frame to `buf`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the serialization fails or the
    /// payload exceeds [`MAX_FRAME_LENGTH`].
    pub fn write<B: BufMut>(&self, mut buf: B) -> Result<(), WriteFrameError> {
        let payload = serde_json::to_vec(&self.data).context(SerializationSnafu)?;
        let len = payload.len();
        ensure!(len <= MAX_FRAME_LENGTH, TooLargeSnafu { len });

        buf.put_u8(MARKER);
        buf.put_u64(len as u64);
        buf.put_slice(&payload);
        Ok(())
    }
}

impl From<Protocol> for Frame {
    fn from(data: Protocol) -> Self {
        Self { data }
    }
}

impl From<Frame> for Protocol {
    fn from(frame: Frame) -> Self {
        frame.data
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ParseFrameError {
    #[snafu(display("Frame is not complete yet"))]
    Incomplete,
    #[snafu(display("Expected frame marker, found byte {found:#04x}"))]
    InvalidStart { found: u8 },
    #[snafu(display("Content length {len} is out of range"))]
    InvalidLength { len: u64 },
    #[snafu(display("Frame payload is not a valid message"))]
    Deserialization { source: SerdeError },
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteFrameError {
    #[snafu(display("Message could not be serialized"))]
    Serialization { source: SerdeError },
    #[snafu(display("Frame payload of {len} bytes is too large"))]
    TooLarge { len: usize },
}
