//! Storage Module
//!
//! The file namespace the server exposes.
//!
//! ## Responsibilities
//! - Enumerate, delete and rename files in one flat root
//! - Open files for download, create files for upload
//! - Reject names that would leave the root
//!
//! ## Layout
//! ```text
//! {storage_root}/
//!   ├── report.txt
//!   ├── photo.png
//!   └── ...          (no subdirectories)
//! ```
//!
//! Concurrent sessions share the root with no in-process locking; each
//! operation relies on the filesystem's own atomicity.

use std::io::{Read, Write};

use crate::error::{FileDropError, Result};
use crate::protocol::DELIMITER;

mod local;

pub use local::LocalStorage;

/// A flat store of named files
pub trait FileStorage: Send + Sync {
    /// Handle returned for downloads
    type Reader: Read + Send;

    /// Handle returned for uploads
    type Writer: Write + Send;

    /// Names of the regular files in the store, sorted
    fn list(&self) -> Result<Vec<String>>;

    /// Remove a file; `NotFound` if it does not exist
    fn delete(&self, name: &str) -> Result<()>;

    /// Rename a file; `NotFound` if `from` does not exist
    fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Open an existing file for reading
    fn open(&self, name: &str) -> Result<Self::Reader>;

    /// Create a file, truncating any previous content
    fn create(&self, name: &str) -> Result<Self::Writer>;
}

/// Check that `name` names a single entry directly inside the root
///
/// Rejects empty names, `.`/`..`, path separators, NUL, the protocol
/// delimiter, and surrounding whitespace (which would not survive decoding).
pub fn validate_filename(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.trim() != name
        || name.contains(|c: char| c == '/' || c == '\\' || c == '\0' || c == DELIMITER);

    if invalid {
        return Err(FileDropError::InvalidFilename(name.to_string()));
    }
    Ok(())
}
