use std::str::Utf8Error;

use snafu::prelude::*;

/// The longest request head accepted, request line and headers included.
pub const MAX_HEAD_LENGTH: usize = 8 * 1024;

const HEAD_END: &[u8] = b"\r\n\r\n";

/// The parts of an HTTP/1.x request head the file server cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
}

impl RequestHead {
    /// Parse a [`RequestHead`] from the prefix of `buf`. Return the head and
    /// the number of bytes it occupied. Header fields are checked for shape
    /// and then discarded.
    ///
    /// # Errors
    ///
    /// This function will return an error if the head is not complete yet, is
    /// too long or is malformed.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), ParseHeadError> {
        let Some(end) = buf.windows(HEAD_END.len()).position(|w| w == HEAD_END) else {
            ensure!(
                buf.len() <= MAX_HEAD_LENGTH,
                TooLargeSnafu { len: buf.len() }
            );
            return IncompleteSnafu.fail();
        };
        let len = end + HEAD_END.len();
        ensure!(len <= MAX_HEAD_LENGTH, TooLargeSnafu { len });

        let text = std::str::from_utf8(&buf[..end]).context(EncodingSnafu)?;
        let mut lines = text.split("\r\n");

        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split(' ');
        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return MalformedSnafu {
                reason: "request line",
            }
            .fail();
        };
        ensure!(
            !method.is_empty() && method.bytes().all(|b| b.is_ascii_uppercase()),
            MalformedSnafu { reason: "method" }
        );
        ensure!(
            target.starts_with('/'),
            MalformedSnafu {
                reason: "request target"
            }
        );
        ensure!(
            version.starts_with("HTTP/1."),
            MalformedSnafu { reason: "version" }
        );

        for line in lines {
            ensure!(
                line.split_once(':').is_some_and(|(name, _)| !name.is_empty()),
                MalformedSnafu {
                    reason: "header field"
                }
            );
        }

        let head = Self {
            method: method.to_owned(),
            target: target.to_owned(),
        };
        Ok((head, len))
    }
}

/// An error type for parsing a request head.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseHeadError {
    #[snafu(display("Could not parse an incomplete request head"))]
    Incomplete,
    #[snafu(display("Could not parse a request head of {len} bytes"))]
    TooLarge { len: usize },
    #[snafu(display("Could not decode the request head"))]
    Encoding { source: Utf8Error },
    #[snafu(display("Could not parse malformed {reason}"))]
    Malformed { reason: &'static str },
}
