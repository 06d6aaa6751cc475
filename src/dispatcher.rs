//! Dispatcher Module
//!
//! Maps one decoded command to storage operations and drives its exchange.
//!
//! ## Responsibilities
//! - Answer list/delete/rename with a single status
//! - Sequence upload: `READY` → receive → final status (partial file removed on failure)
//! - Sequence download: `SUCCESS` → send → half-close
//! - Reject missing arguments before touching storage
//!
//! Storage failures become `ERROR:` replies here. Only failures of the
//! connection itself are returned to the caller.

use std::io::{Read, Write};

use crate::error::{FileDropError, Result};
use crate::protocol::{write_status, Command, CommandType, InvalidCommand, Request, Status};
use crate::storage::FileStorage;
use crate::transfer::{receive_file, send_file, HalfClose};

/// Reply texts, without their `SUCCESS:`/`ERROR:` tags
pub mod messages {
    pub const FILE_DELETED: &str = "File deleted.";
    pub const DELETE_FAILED: &str = "File not found or could not be deleted.";
    pub const FILE_RENAMED: &str = "File renamed.";
    pub const RENAME_FAILED: &str = "File not found or could not be renamed.";
    pub const UPLOAD_COMPLETE: &str = "Upload complete.";
    pub const UPLOAD_FAILED: &str = "Server failed during upload.";
    pub const CREATE_FAILED: &str = "Could not create file.";
    pub const FILE_NOT_FOUND: &str = "File not found.";
    pub const OPEN_FAILED: &str = "Could not open file.";
    pub const LIST_FAILED: &str = "Could not list files.";
    pub const UNKNOWN_COMMAND: &str = "Unknown command";
    pub const SERVER_BUSY: &str = "Server busy.";

    pub const MISSING_DELETE: &str = "Missing filename for delete.";
    pub const MISSING_RENAME: &str = "Missing original and new filenames for rename.";
    pub const MISSING_UPLOAD: &str = "Missing filename for upload.";
    pub const MISSING_DOWNLOAD: &str = "Missing filename for download.";
}

/// Executes commands against one storage root
pub struct Dispatcher<S: FileStorage> {
    /// The storage root every session shares
    storage: S,

    /// Bytes moved per read/write during transfers
    chunk_size: usize,
}

impl<S: FileStorage> Dispatcher<S> {
    /// Create a dispatcher over `storage`
    pub fn new(storage: S, chunk_size: usize) -> Self {
        Self {
            storage,
            chunk_size,
        }
    }

    /// The underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Run one request to completion on `conn`
    ///
    /// Returns an error only if the connection fails; the caller should
    /// then close it without writing anything further.
    pub fn dispatch<C>(&self, request: Request, conn: &mut C) -> Result<()>
    where
        C: Read + Write + HalfClose + ?Sized,
    {
        let command = match request {
            Ok(command) => command,
            Err(invalid) => {
                tracing::debug!("Rejecting request: {}", invalid);
                return write_status(conn, &reject(&invalid));
            }
        };

        match command {
            Command::Upload { name } => self.upload(&name, conn),
            Command::Download { name } => self.download(&name, conn),
            Command::Quit => {
                tracing::debug!("Client sent quit, closing");
                Ok(())
            }
            Command::List => write_status(conn, &self.list()),
            Command::Delete { name } => write_status(conn, &self.delete(&name)),
            Command::Rename { from, to } => write_status(conn, &self.rename(&from, &to)),
        }
    }

    fn list(&self) -> Status {
        match self.storage.list() {
            Ok(names) => Status::Listing(names),
            Err(e) => {
                tracing::warn!("List failed: {}", e);
                Status::error(messages::LIST_FAILED)
            }
        }
    }

    fn delete(&self, name: &str) -> Status {
        match self.storage.delete(name) {
            Ok(()) => {
                tracing::debug!("Deleted {}", name);
                Status::success(messages::FILE_DELETED)
            }
            Err(e) => {
                tracing::debug!("Delete of {} failed: {}", name, e);
                Status::error(messages::DELETE_FAILED)
            }
        }
    }

    fn rename(&self, from: &str, to: &str) -> Status {
        match self.storage.rename(from, to) {
            Ok(()) => {
                tracing::debug!("Renamed {} -> {}", from, to);
                Status::success(messages::FILE_RENAMED)
            }
            Err(e) => {
                tracing::debug!("Rename of {} failed: {}", from, e);
                Status::error(messages::RENAME_FAILED)
            }
        }
    }

    /// `READY`, then receive until the client half-closes
    fn upload<C>(&self, name: &str, conn: &mut C) -> Result<()>
    where
        C: Read + Write + HalfClose + ?Sized,
    {
        let mut file = match self.storage.create(name) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Cannot create {} for upload: {}", name, e);
                return write_status(conn, &Status::error(messages::CREATE_FAILED));
            }
        };

        let received = write_status(conn, &Status::Ready)
            .and_then(|_| receive_file(conn, &mut file, self.chunk_size));
        drop(file);

        match received {
            Ok(summary) => {
                tracing::info!("Stored upload {} ({})", name, summary);
                write_status(conn, &Status::success(messages::UPLOAD_COMPLETE))
            }
            Err(e) => {
                tracing::warn!("Upload of {} failed: {}", name, e);
                self.discard(name);
                let reply = write_status(conn, &Status::error(messages::UPLOAD_FAILED));
                if let Err(reply_err) = reply {
                    tracing::debug!("Could not report failed upload of {}: {}", name, reply_err);
                }
                Ok(())
            }
        }
    }

    /// `SUCCESS`, then stream the file and half-close
    fn download<C>(&self, name: &str, conn: &mut C) -> Result<()>
    where
        C: Read + Write + HalfClose + ?Sized,
    {
        let mut file = match self.storage.open(name) {
            Ok(file) => file,
            Err(FileDropError::NotFound(_)) | Err(FileDropError::InvalidFilename(_)) => {
                tracing::debug!("Download of missing file {}", name);
                return write_status(conn, &Status::error(messages::FILE_NOT_FOUND));
            }
            Err(e) => {
                tracing::warn!("Cannot open {} for download: {}", name, e);
                return write_status(conn, &Status::error(messages::OPEN_FAILED));
            }
        };

        write_status(conn, &Status::Success(None))?;
        let summary = send_file(conn, &mut file, self.chunk_size)?;
        tracing::info!("Served download {} ({})", name, summary);
        Ok(())
    }

    /// Remove a partially written upload
    fn discard(&self, name: &str) {
        match self.storage.delete(name) {
            Ok(()) | Err(FileDropError::NotFound(_)) => {}
            Err(e) => tracing::warn!("Could not remove partial upload {}: {}", name, e),
        }
    }
}

/// Reply for a request that did not decode
fn reject(invalid: &InvalidCommand) -> Status {
    let message = match invalid {
        InvalidCommand::Unknown(_) => messages::UNKNOWN_COMMAND,
        InvalidCommand::MissingArgument(kind) => match kind {
            CommandType::Delete => messages::MISSING_DELETE,
            CommandType::Rename => messages::MISSING_RENAME,
            CommandType::Upload => messages::MISSING_UPLOAD,
            CommandType::Download => messages::MISSING_DOWNLOAD,
            CommandType::List | CommandType::Quit => messages::UNKNOWN_COMMAND,
        },
    };
    Status::error(message)
}
