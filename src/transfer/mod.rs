//! Transfer Module
//!
//! Moves raw file bytes between a connection and a file handle.
//!
//! ## Responsibilities
//! - Copy in bounded chunks, in both directions
//! - Signal end of payload by half-closing the sender's write side
//! - Separate the control literal from payload bytes that share its read
//! - Checksum every transfer (CRC32) for the user-facing summary
//!
//! The chunk size is local to each end and never appears on the wire.

use std::fmt;
use std::io;
use std::net::{Shutdown, TcpStream};

mod stream;
mod handshake;

pub use stream::{send_file, receive_file, create_destination};
pub use handshake::{read_handshake, Handshake};

/// Default bytes moved per read/write
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// A connection whose write direction can be shut down on its own
///
/// After `close_write` the peer reads end-of-stream, while this side can
/// still read whatever the peer sends back.
pub trait HalfClose {
    fn close_write(&mut self) -> io::Result<()>;
}

impl HalfClose for TcpStream {
    fn close_write(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Write)
    }
}

impl<T: HalfClose + ?Sized> HalfClose for &mut T {
    fn close_write(&mut self) -> io::Result<()> {
        (**self).close_write()
    }
}

/// What a finished transfer moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferSummary {
    /// Payload bytes copied
    pub bytes: u64,

    /// CRC32 of the payload
    pub crc32: u32,
}

impl fmt::Display for TransferSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes, crc32 {:08x}", self.bytes, self.crc32)
    }
}
