//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (line-based text, raw payload)
//!
//! One TCP connection carries exactly one command:
//!
//! ```text
//! client                               server
//!   │ ── list | delete%a | rename%a%b ──▶ │
//!   │ ◀───────────── reply ────────────── │ close
//!
//!   │ ── upload%name ──────────────────▶ │
//!   │ ◀──────────── READY ────────────── │
//!   │ ── raw bytes ... half-close ─────▶ │
//!   │ ◀── SUCCESS: Upload complete. ──── │ close
//!
//!   │ ── download%name ────────────────▶ │
//!   │ ◀── SUCCESS raw bytes ... ──────── │ half-close
//! ```
//!
//! Payloads carry no length field: the sender half-closes its write side
//! and the receiver reads until end-of-stream.

mod command;
mod status;
mod codec;

pub use command::{Command, CommandType, InvalidCommand, Request};
pub use status::Status;
pub use codec::{
    encode_command, decode_command, encode_status, decode_status, decode_listing,
    read_request, write_command, write_status, read_reply,
    DELIMITER, ERROR_TAG, SUCCESS_TAG, READY, NO_FILES, COMMAND_BUFFER_SIZE, MAX_REPLY_SIZE,
};
