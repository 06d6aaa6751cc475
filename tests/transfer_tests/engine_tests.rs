//! Tests for the transfer engine
//!
//! These tests verify:
//! - Chunked send/receive at sizes around the chunk boundary
//! - Half-close after the last chunk
//! - Partial writes and interrupted reads
//! - Handshake classification and leftover payload bytes

use std::io::{self, Cursor, Read, Write};

use filedrop::protocol::{Status, READY, SUCCESS_TAG};
use filedrop::transfer::{
    create_destination, read_handshake, receive_file, send_file, HalfClose, DEFAULT_CHUNK_SIZE,
};
use filedrop::FileDropError;
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

/// Write side of a connection that records what was sent
#[derive(Default)]
struct RecordingConn {
    sent: Vec<u8>,
    write_closed: bool,
    max_write: Option<usize>,
}

impl Write for RecordingConn {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.write_closed {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        let n = self.max_write.map_or(buf.len(), |max| buf.len().min(max));
        self.sent.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl HalfClose for RecordingConn {
    fn close_write(&mut self) -> io::Result<()> {
        self.write_closed = true;
        Ok(())
    }
}

/// Reader that hands out at most `step` bytes per read
struct Trickle {
    data: Cursor<Vec<u8>>,
    step: usize,
    interrupt_next: bool,
}

impl Trickle {
    fn new(data: &[u8], step: usize) -> Self {
        Self {
            data: Cursor::new(data.to_vec()),
            step,
            interrupt_next: false,
        }
    }
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Alternate interrupted and real reads
        self.interrupt_next = !self.interrupt_next;
        if self.interrupt_next {
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let n = buf.len().min(self.step);
        self.data.read(&mut buf[..n])
    }
}

/// Reader that fails after yielding some bytes
struct Broken {
    remaining: usize,
}

impl Read for Broken {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::from(io::ErrorKind::ConnectionReset));
        }
        let n = buf.len().min(self.remaining);
        buf[..n].fill(b'x');
        self.remaining -= n;
        Ok(n)
    }
}

fn pattern(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i * 31 % 251) as u8).collect()
}

// =============================================================================
// send_file Tests
// =============================================================================

#[test]
fn test_send_file_boundary_sizes() {
    for size in [0, 1, 8191, 8192, 8193, 100_000] {
        let data = pattern(size);
        let mut conn = RecordingConn::default();

        let summary = send_file(&mut conn, &mut Cursor::new(&data), DEFAULT_CHUNK_SIZE).unwrap();

        assert_eq!(conn.sent, data, "size {}", size);
        assert_eq!(summary.bytes, size as u64);
        assert_eq!(summary.crc32, crc32fast::hash(&data));
        assert!(conn.write_closed, "size {} not half-closed", size);
    }
}

#[test]
fn test_send_file_retries_partial_writes() {
    let data = pattern(20_000);
    let mut conn = RecordingConn {
        max_write: Some(7),
        ..Default::default()
    };

    send_file(&mut conn, &mut Cursor::new(&data), 4096).unwrap();

    assert_eq!(conn.sent, data);
}

#[test]
fn test_send_file_retries_interrupted_reads() {
    let data = pattern(3000);
    let mut conn = RecordingConn::default();

    send_file(&mut conn, &mut Trickle::new(&data, 100), 512).unwrap();

    assert_eq!(conn.sent, data);
}

#[test]
fn test_send_file_write_failure() {
    let mut conn = RecordingConn {
        write_closed: true,
        ..Default::default()
    };

    let result = send_file(&mut conn, &mut Cursor::new(b"payload".to_vec()), 1024);
    assert!(matches!(result, Err(FileDropError::Io(_))));
}

// =============================================================================
// receive_file Tests
// =============================================================================

#[test]
fn test_receive_file_boundary_sizes() {
    for size in [0, 1, 8191, 8192, 8193, 100_000] {
        let data = pattern(size);
        let mut sink = Vec::new();

        let summary = receive_file(&mut Cursor::new(&data), &mut sink, DEFAULT_CHUNK_SIZE).unwrap();

        assert_eq!(sink, data, "size {}", size);
        assert_eq!(summary.bytes, size as u64);
    }
}

#[test]
fn test_receive_file_unaligned_chunks() {
    let data = pattern(10_000);
    let mut sink = Vec::new();

    receive_file(&mut Trickle::new(&data, 333), &mut sink, 1000).unwrap();

    assert_eq!(sink, data);
}

#[test]
fn test_receive_file_connection_reset() {
    let mut sink = Vec::new();
    let result = receive_file(&mut Broken { remaining: 5000 }, &mut sink, 1024);

    match result {
        Err(e) => assert!(e.is_disconnect()),
        Ok(_) => panic!("Expected reset to surface"),
    }
    assert_eq!(sink.len(), 5000);
}

#[test]
fn test_summaries_match_across_directions() {
    let data = pattern(50_000);
    let mut conn = RecordingConn::default();
    let sent = send_file(&mut conn, &mut Cursor::new(&data), 4096).unwrap();

    let mut sink = Vec::new();
    let received = receive_file(&mut Cursor::new(conn.sent), &mut sink, 1500).unwrap();

    assert_eq!(sent, received);
    assert_eq!(sent.to_string(), format!("50000 bytes, crc32 {:08x}", sent.crc32));
}

#[test]
fn test_zero_chunk_size_still_copies() {
    let mut sink = Vec::new();
    receive_file(&mut Cursor::new(b"abc".to_vec()), &mut sink, 0).unwrap();
    assert_eq!(sink, b"abc");
}

#[test]
fn test_create_destination_truncates() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.bin");
    std::fs::write(&path, b"old contents that are long").unwrap();

    let mut file = create_destination(&path).unwrap();
    receive_file(&mut Cursor::new(b"new".to_vec()), &mut file, 1024).unwrap();
    drop(file);

    assert_eq!(std::fs::read(&path).unwrap(), b"new");
}

// =============================================================================
// Handshake Tests
// =============================================================================

#[test]
fn test_handshake_ready() {
    let mut conn = Cursor::new(b"READY".to_vec());
    let handshake = read_handshake(&mut conn, READY).unwrap();

    assert_eq!(handshake.status, Status::Ready);
    assert!(handshake.leftover.is_empty());
}

#[test]
fn test_handshake_keeps_payload_from_same_read() {
    let mut wire = b"SUCCESS".to_vec();
    wire.extend_from_slice(b"\x89PNG file body");
    let mut conn = Cursor::new(wire);

    let handshake = read_handshake(&mut conn, SUCCESS_TAG).unwrap();

    assert_eq!(handshake.status, Status::Success(None));
    assert_eq!(&handshake.leftover[..], b"\x89PNG file body");
}

#[test]
fn test_handshake_literal_split_across_reads() {
    let mut wire = b"SUCCESS".to_vec();
    wire.extend(pattern(5000));
    let mut conn = Trickle::new(&wire, 3);

    let handshake = read_handshake(&mut conn, SUCCESS_TAG).unwrap();
    assert_eq!(handshake.status, Status::Success(None));

    // Leftover plus the rest of the stream is exactly the payload
    let mut payload = handshake.leftover.to_vec();
    conn.read_to_end(&mut payload).unwrap();
    assert_eq!(payload, pattern(5000));
}

#[test]
fn test_handshake_error_reads_full_message() {
    let mut conn = Trickle::new(b"ERROR: File not found.", 4);
    let handshake = read_handshake(&mut conn, SUCCESS_TAG).unwrap();

    assert_eq!(handshake.status, Status::Error("File not found.".to_string()));
    assert!(handshake.leftover.is_empty());
}

#[test]
fn test_handshake_unknown_reply() {
    let mut conn = Cursor::new(b"HELLO there".to_vec());
    let handshake = read_handshake(&mut conn, READY).unwrap();

    assert!(matches!(handshake.status, Status::Unknown(_)));
}

#[test]
fn test_handshake_truncated_literal_is_unknown() {
    let mut conn = Cursor::new(b"REA".to_vec());
    let handshake = read_handshake(&mut conn, READY).unwrap();

    assert_eq!(handshake.status, Status::Unknown("REA".to_string()));
}

#[test]
fn test_handshake_peer_closed() {
    let mut conn = Cursor::new(Vec::new());
    let result = read_handshake(&mut conn, READY);

    assert!(matches!(result, Err(FileDropError::PeerClosed(_))));
}
