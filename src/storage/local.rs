//! Local directory storage
//!
//! Serves one directory on the host filesystem.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{FileDropError, Result};
use crate::transfer::create_destination;

use super::{validate_filename, FileStorage};

/// Storage backed by a directory on disk
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Directory holding every stored file
    root: PathBuf,
}

impl LocalStorage {
    /// Open storage rooted at `path`, creating the directory if needed
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// The storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `name` to a path inside the root
    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_filename(name)?;
        Ok(self.root.join(name))
    }

    /// Resolve `name` to an existing regular file
    fn existing_file(&self, name: &str) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(FileDropError::NotFound(name.to_string()));
        }
        Ok(path)
    }
}

/// Turn an OS "not found" into the storage error for `name`
fn not_found_as(name: &str, e: std::io::Error) -> FileDropError {
    if e.kind() == ErrorKind::NotFound {
        FileDropError::NotFound(name.to_string())
    } else {
        FileDropError::Io(e)
    }
}

impl FileStorage for LocalStorage {
    type Reader = File;
    type Writer = File;

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!("Skipping non UTF-8 file name {:?}", raw),
            }
        }

        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.existing_file(name)?;
        fs::remove_file(&path).map_err(|e| not_found_as(name, e))
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        let source = self.existing_file(from)?;
        let target = self.path_for(to)?;
        fs::rename(&source, &target).map_err(|e| not_found_as(from, e))
    }

    fn open(&self, name: &str) -> Result<File> {
        let path = self.existing_file(name)?;
        File::open(&path).map_err(|e| not_found_as(name, e))
    }

    fn create(&self, name: &str) -> Result<File> {
        let path = self.path_for(name)?;
        create_destination(&path)
    }
}
