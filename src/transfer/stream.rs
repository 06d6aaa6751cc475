//! Chunked byte relay between a connection and a file
//!
//! Neither direction assumes any chunk lines up with an application-level
//! boundary: bytes are copied as they arrive.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use crc32fast::Hasher;

use crate::error::Result;
use super::{HalfClose, TransferSummary};

/// Running byte count and checksum for one transfer
struct Tally {
    bytes: u64,
    hasher: Hasher,
}

impl Tally {
    fn new() -> Self {
        Self {
            bytes: 0,
            hasher: Hasher::new(),
        }
    }

    fn record(&mut self, chunk: &[u8]) {
        self.bytes += chunk.len() as u64;
        self.hasher.update(chunk);
    }

    fn finish(self) -> TransferSummary {
        TransferSummary {
            bytes: self.bytes,
            crc32: self.hasher.finalize(),
        }
    }
}

/// Read into `buf`, retrying interrupted reads. Returns 0 at end-of-stream.
fn read_chunk<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

/// Stream a file to the connection, then half-close the connection
///
/// Each chunk is written in full before the next read; partial socket
/// writes are retried by `write_all`.
pub fn send_file<C, F>(conn: &mut C, file: &mut F, chunk_size: usize) -> Result<TransferSummary>
where
    C: Write + HalfClose + ?Sized,
    F: Read + ?Sized,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut tally = Tally::new();

    loop {
        let n = read_chunk(file, &mut buf)?;
        if n == 0 {
            break;
        }
        conn.write_all(&buf[..n])?;
        tally.record(&buf[..n]);
    }

    conn.flush()?;
    conn.close_write()?;

    let summary = tally.finish();
    tracing::debug!("Sent {}", summary);
    Ok(summary)
}

/// Copy everything the connection sends into `file` until end-of-stream
///
/// `file` must already be empty; see [`create_destination`].
pub fn receive_file<C, F>(conn: &mut C, file: &mut F, chunk_size: usize) -> Result<TransferSummary>
where
    C: Read + ?Sized,
    F: Write + ?Sized,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut tally = Tally::new();

    loop {
        let n = read_chunk(conn, &mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        tally.record(&buf[..n]);
    }

    file.flush()?;

    let summary = tally.finish();
    tracing::debug!("Received {}", summary);
    Ok(summary)
}

/// Create or truncate a local file to receive a transfer
pub fn create_destination(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    Ok(file)
}
