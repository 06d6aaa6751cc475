//! Client Module
//!
//! Drives the client side of every command, one connection per command.
//!
//! ## Responsibilities
//! - Typed calls for each command (`list`, `delete`, `rename`, `upload`, `download`)
//! - Upload: check the local file first, wait for `READY`, stream, half-close
//! - Download: wait for `SUCCESS`, keep payload bytes that arrived with it
//! - Interactive prompt loop where a failed command never ends the session

use std::fs::{self, File};
use std::io::{BufRead, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use bytes::Buf;

use crate::config::ClientConfig;
use crate::error::{FileDropError, Result};
use crate::protocol::{
    decode_command, decode_listing, decode_status, encode_command, read_reply, write_command,
    Command, CommandType, InvalidCommand, Status, READY, SUCCESS_TAG,
};
use crate::storage::validate_filename;
use crate::transfer::{create_destination, read_handshake, receive_file, send_file, TransferSummary};

/// Prompt shown before each interactive command
pub const PROMPT: &str = "Enter command (list, delete, rename, download, upload, quit): ";

/// Result of a finished upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Name the file was stored under
    pub name: String,

    /// What was sent
    pub summary: TransferSummary,

    /// Server's confirmation text
    pub message: String,
}

/// Result of a finished download
#[derive(Debug, Clone)]
pub struct DownloadReceipt {
    /// Where the file was written
    pub path: PathBuf,

    /// What was received
    pub summary: TransferSummary,
}

/// FileDrop client
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Create a client for the configured server
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// File names on the server
    pub fn list(&self) -> Result<Vec<String>> {
        let reply = self.round_trip(&encode_command(&Command::List))?;
        if let Status::Error(message) = decode_status(&reply) {
            return Err(FileDropError::Remote(message));
        }
        Ok(decode_listing(&reply))
    }

    /// Delete a file on the server; returns the confirmation text
    pub fn delete(&self, name: &str) -> Result<String> {
        let command = Command::Delete {
            name: name.to_string(),
        };
        expect_success(&self.round_trip(&encode_command(&command))?)
    }

    /// Rename a file on the server; returns the confirmation text
    pub fn rename(&self, from: &str, to: &str) -> Result<String> {
        let command = Command::Rename {
            from: from.to_string(),
            to: to.to_string(),
        };
        expect_success(&self.round_trip(&encode_command(&command))?)
    }

    /// Upload a local file, stored on the server under its file name
    ///
    /// The local file is opened before connecting, so a missing file never
    /// leaves the server waiting for bytes.
    pub fn upload(&self, local_path: &Path) -> Result<UploadReceipt> {
        let mut file = open_local(local_path)?;
        let name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FileDropError::InvalidFilename(local_path.display().to_string()))?
            .to_string();
        validate_filename(&name)?;

        let mut stream = self.connect()?;
        write_command(&mut stream, &Command::Upload { name: name.clone() })?;

        let handshake = read_handshake(&mut stream, READY)?;
        match handshake.status {
            Status::Ready => {}
            Status::Error(message) => return Err(FileDropError::Remote(message)),
            other => return Err(unexpected(other)),
        }

        tracing::debug!("Server ready, uploading {}", local_path.display());
        let summary = send_file(&mut stream, &mut file, self.config.chunk_size)?;

        let reply = read_reply(&mut stream)?;
        if reply.is_empty() {
            return Err(FileDropError::PeerClosed(
                "upload sent, but no final confirmation from server".to_string(),
            ));
        }
        let message = expect_success(&reply)?;

        Ok(UploadReceipt {
            name,
            summary,
            message,
        })
    }

    /// Download a server file into the download directory
    ///
    /// No local file is created unless the server answers `SUCCESS`.
    pub fn download(&self, name: &str) -> Result<DownloadReceipt> {
        validate_filename(name)?;

        let mut stream = self.connect()?;
        write_command(&mut stream, &Command::Download { name: name.to_string() })?;

        let handshake = read_handshake(&mut stream, SUCCESS_TAG)?;
        match handshake.status {
            Status::Success(_) => {}
            Status::Error(message) => return Err(FileDropError::Remote(message)),
            other => return Err(unexpected(other)),
        }

        fs::create_dir_all(&self.config.download_dir)?;
        let path = self.config.download_dir.join(name);
        let mut file = create_destination(&path)?;

        tracing::debug!("Downloading {} to {}", name, path.display());
        let mut source = handshake.leftover.reader().chain(&mut stream);
        let received = receive_file(&mut source, &mut file, self.config.chunk_size);
        drop(file);

        match received {
            Ok(summary) => Ok(DownloadReceipt { path, summary }),
            Err(e) => {
                if let Err(rm) = fs::remove_file(&path) {
                    tracing::warn!("Could not remove partial download {}: {}", path.display(), rm);
                }
                Err(e)
            }
        }
    }

    // =========================================================================
    // Interactive driver
    // =========================================================================

    /// Run one line of user input and describe the outcome
    ///
    /// Lines other than upload/download are sent as typed and the server's
    /// reply is returned verbatim, so its own error text reaches the user.
    pub fn execute(&self, line: &str) -> Result<String> {
        let line = line.trim();

        match decode_command(line.as_bytes()) {
            Ok(Command::Upload { name }) => {
                let receipt = self.upload(Path::new(&name))?;
                Ok(format!(
                    "Uploaded {} ({})\nServer response: {}",
                    receipt.name, receipt.summary, receipt.message
                ))
            }
            Ok(Command::Download { name }) => {
                let receipt = self.download(&name)?;
                Ok(format!(
                    "Download complete: {} ({})",
                    receipt.path.display(),
                    receipt.summary
                ))
            }
            Err(InvalidCommand::MissingArgument(CommandType::Upload)) => {
                Ok("Usage: upload%<local_filename>".to_string())
            }
            Err(InvalidCommand::MissingArgument(CommandType::Download)) => {
                Ok("Usage: download%<server_filename>".to_string())
            }
            _ => {
                let reply = self.round_trip(line.as_bytes())?;
                if reply.is_empty() {
                    Ok("Server did not send a response.".to_string())
                } else {
                    Ok(format!("Server response:\n{}", String::from_utf8_lossy(&reply)))
                }
            }
        }
    }

    /// Prompt, execute, repeat until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<()> {
        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            // Raw bytes: a line that is not UTF-8 must not end the session
            let mut raw = Vec::new();
            if input.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.eq_ignore_ascii_case(CommandType::Quit.name()) {
                break;
            }

            match self.execute(line) {
                Ok(message) => writeln!(output, "{}", message)?,
                Err(e) => {
                    tracing::debug!("Command {:?} failed: {}", line, e);
                    writeln!(output, "Client error: {}", e)?;
                }
            }
        }

        writeln!(output, "Client shutting down.")?;
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn connect(&self) -> Result<TcpStream> {
        let stream = TcpStream::connect(&self.config.server_addr)?;
        stream.set_nodelay(true)?;
        tracing::debug!("Connected to {}", self.config.server_addr);
        Ok(stream)
    }

    /// Send a request line and read the reply until the server closes
    fn round_trip(&self, line: &[u8]) -> Result<Vec<u8>> {
        let mut stream = self.connect()?;
        stream.write_all(line)?;
        stream.flush()?;
        read_reply(&mut stream)
    }
}

/// Open a local upload source, which must be a regular file
fn open_local(path: &Path) -> Result<File> {
    let not_found = || FileDropError::NotFound(format!("{} (local)", path.display()));

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => not_found(),
        _ => FileDropError::Io(e),
    })?;
    if !file.metadata()?.is_file() {
        return Err(not_found());
    }
    Ok(file)
}

/// Message of a `SUCCESS` reply, or the matching error
fn expect_success(reply: &[u8]) -> Result<String> {
    match decode_status(reply) {
        Status::Success(message) => Ok(message.unwrap_or_default()),
        Status::Error(message) => Err(FileDropError::Remote(message)),
        other => Err(unexpected(other)),
    }
}

fn unexpected(status: Status) -> FileDropError {
    match status {
        Status::Unknown(text) => {
            FileDropError::Protocol(format!("Unknown server response: {:?}", text))
        }
        other => FileDropError::Protocol(format!("Unexpected server response: {:?}", other)),
    }
}
