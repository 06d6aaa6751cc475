//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Line
//! ```text
//! <command>[%<arg1>[%<arg2>]]
//! ```
//! UTF-8, no trailing delimiter or newline required. Trailing whitespace is
//! ignored on decode.
//!
//! ### Responses
//! ```text
//! READY                  upload may start
//! SUCCESS                download bytes follow
//! SUCCESS: <message>     operation done
//! ERROR: <message>       operation failed
//! name1\nname2...        list body (untagged)
//! ```

use std::io::{ErrorKind, Read, Write};

use crate::error::Result;
use super::{Command, CommandType, InvalidCommand, Request, Status};

/// Separator between a command and its arguments
pub const DELIMITER: char = '%';

/// Prefix of every error response
pub const ERROR_TAG: &str = "ERROR:";

/// Prefix of every success response
pub const SUCCESS_TAG: &str = "SUCCESS";

/// Exact upload handshake literal
pub const READY: &str = "READY";

/// List body when the storage root holds no files
pub const NO_FILES: &str = "No files on the server.";

/// Size of the single read a server session makes for the request line
pub const COMMAND_BUFFER_SIZE: usize = 1024;

/// Maximum response body read to end-of-stream (16 MB)
pub const MAX_REPLY_SIZE: u64 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command as a request line
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut line = command.command_type().name().to_string();
    for arg in command.args() {
        line.push(DELIMITER);
        line.push_str(arg);
    }
    line.into_bytes()
}

/// Decode a request line
///
/// Extra arguments are ignored; empty arguments count as missing.
pub fn decode_command(bytes: &[u8]) -> Request {
    let text = String::from_utf8_lossy(bytes);
    let line = text.trim_end();

    let mut tokens = line.split(DELIMITER);
    let head = tokens.next().unwrap_or_default();
    let kind = CommandType::from_name(head)
        .ok_or_else(|| InvalidCommand::Unknown(line.to_string()))?;

    let mut arg = || {
        tokens
            .next()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(InvalidCommand::MissingArgument(kind))
    };

    Ok(match kind {
        CommandType::List => Command::List,
        CommandType::Quit => Command::Quit,
        CommandType::Delete => Command::Delete { name: arg()? },
        CommandType::Upload => Command::Upload { name: arg()? },
        CommandType::Download => Command::Download { name: arg()? },
        CommandType::Rename => {
            let from = arg()?;
            let to = arg()?;
            Command::Rename { from, to }
        }
    })
}

// =============================================================================
// Status Encoding/Decoding
// =============================================================================

/// Encode a status as response text
pub fn encode_status(status: &Status) -> Vec<u8> {
    let text = match status {
        Status::Ready => READY.to_string(),
        Status::Success(None) => SUCCESS_TAG.to_string(),
        Status::Success(Some(message)) => format!("{}: {}", SUCCESS_TAG, message),
        Status::Error(message) => format!("{} {}", ERROR_TAG, message),
        Status::Listing(names) if names.is_empty() => NO_FILES.to_string(),
        Status::Listing(names) => names.join("\n"),
        Status::Unknown(text) => text.clone(),
    };
    text.into_bytes()
}

/// Classify response text by its fixed prefix
///
/// Never yields [`Status::Listing`]; see [`decode_listing`].
pub fn decode_status(bytes: &[u8]) -> Status {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_end();

    if let Some(message) = text.strip_prefix(ERROR_TAG) {
        return Status::Error(message.trim_start().to_string());
    }
    if text == READY {
        return Status::Ready;
    }
    if let Some(rest) = text.strip_prefix(SUCCESS_TAG) {
        let message = rest.trim_start_matches(':').trim_start();
        return if message.is_empty() {
            Status::Success(None)
        } else {
            Status::Success(Some(message.to_string()))
        };
    }
    Status::Unknown(text.to_string())
}

/// Decode a list body into file names
pub fn decode_listing(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_end();
    if text.is_empty() || text == NO_FILES {
        return Vec::new();
    }
    text.lines().map(str::to_string).collect()
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a request line with a single bounded read
///
/// Returns `None` if the peer closed before sending anything. Clients wait
/// for a reply before sending payload, so one read never crosses into it.
pub fn read_request<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Request>> {
    let mut buf = [0u8; COMMAND_BUFFER_SIZE];
    let n = loop {
        match reader.read(&mut buf) {
            Ok(n) => break n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    };
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(decode_command(&buf[..n])))
}

/// Write a command to a stream
pub fn write_command<W: Write + ?Sized>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Write a status to a stream
pub fn write_status<W: Write + ?Sized>(writer: &mut W, status: &Status) -> Result<()> {
    writer.write_all(&encode_status(status))?;
    writer.flush()?;
    Ok(())
}

/// Read a reply until the peer closes the stream
///
/// Replies are not length-prefixed; the server closes after each one.
pub fn read_reply<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>> {
    let mut reply = Vec::new();
    Read::take(&mut *reader, MAX_REPLY_SIZE).read_to_end(&mut reply)?;
    Ok(reply)
}
