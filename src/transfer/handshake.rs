//! Reading the status literal that opens a transfer
//!
//! The server writes `SUCCESS` and the first file bytes back to back, so a
//! single read can return both. This reads only as far as it must to
//! classify the reply and hands back whatever payload came along with it.
//!
//! ```text
//!  read 1: "SUCC"          undecided, keep reading
//!  read 2: "ESS\x89PNG.."  status = SUCCESS, leftover = "\x89PNG.."
//! ```

use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::error::{FileDropError, Result};
use crate::protocol::{decode_status, Status, ERROR_TAG, MAX_REPLY_SIZE};

/// Bytes requested per read while waiting for the literal
const HANDSHAKE_READ_SIZE: usize = 1024;

/// A classified opening reply
#[derive(Debug)]
pub struct Handshake {
    /// The decoded reply
    pub status: Status,

    /// Payload bytes that arrived in the same read as the literal
    pub leftover: Bytes,
}

impl Handshake {
    fn without_payload(status: Status) -> Self {
        Self {
            status,
            leftover: Bytes::new(),
        }
    }
}

/// Read until the reply is known to be `expected`, an error, or neither
///
/// - starts with `expected`: that status, plus any bytes after it
/// - starts with `ERROR:`: the full message, read until the server closes
/// - cannot become either: [`Status::Unknown`]
/// - stream ends before the first byte: [`FileDropError::PeerClosed`]
pub fn read_handshake<C: Read + ?Sized>(conn: &mut C, expected: &str) -> Result<Handshake> {
    let expected = expected.as_bytes();
    let error_tag = ERROR_TAG.as_bytes();

    let mut buf = BytesMut::with_capacity(HANDSHAKE_READ_SIZE);
    let mut chunk = [0u8; HANDSHAKE_READ_SIZE];

    loop {
        if buf.starts_with(expected) {
            let literal = buf.split_to(expected.len());
            return Ok(Handshake {
                status: decode_status(&literal),
                leftover: buf.freeze(),
            });
        }

        if buf.starts_with(error_tag) {
            let mut rest = Vec::new();
            Read::take(&mut *conn, MAX_REPLY_SIZE).read_to_end(&mut rest)?;
            buf.extend_from_slice(&rest);
            return Ok(Handshake::without_payload(decode_status(&buf)));
        }

        if !buf.is_empty() && !expected.starts_with(&buf[..]) && !error_tag.starts_with(&buf[..]) {
            return Ok(Handshake::without_payload(unknown(&buf)));
        }

        let n = match conn.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        if n == 0 {
            if buf.is_empty() {
                return Err(FileDropError::PeerClosed(
                    "server closed the connection without replying".to_string(),
                ));
            }
            return Ok(Handshake::without_payload(unknown(&buf)));
        }

        buf.extend_from_slice(&chunk[..n]);
    }
}

fn unknown(bytes: &[u8]) -> Status {
    Status::Unknown(String::from_utf8_lossy(bytes).trim_end().to_string())
}
