//! Path validation before any file is read or written.
//!
//! Review targets may come from untrusted input (a symlink to a secret, a FIFO,
//! a multi-gigabyte blob). Every read and write in the crate goes through
//! [`SafeAccessor`], and a denial is a hard stop for the caller.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Largest file the accessor will read or overwrite (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// What the caller intends to do with the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Read an existing file.
    Read,
    /// Create or replace a file inside the sandbox.
    Write,
}

/// Why a path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    /// Nothing exists at the path.
    #[error("path does not exist")]
    Missing,
    /// The path is a symbolic link.
    #[error("path is a symbolic link")]
    Symlink,
    /// Directory, FIFO, socket or device.
    #[error("path is not a regular file")]
    NotRegularFile,
    /// The file cannot be opened for reading.
    #[error("file is not readable")]
    Unreadable,
    /// The file exceeds the size cap.
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },
    /// The parent directory is missing or read-only.
    #[error("parent directory is not writable")]
    ParentNotWritable,
    /// Writes must stay inside the sandbox directory.
    #[error("path is outside the sandbox")]
    OutsideSandbox,
    /// Any other I/O failure while inspecting the path.
    #[error("I/O error: {0}")]
    Io(String),
}

/// A path was rejected by [`SafeAccessor::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("access denied for {path}: {reason}")]
pub struct AccessDenied {
    /// The path as given.
    pub path: PathBuf,
    /// What check failed.
    pub reason: DenyReason,
}

/// A path that passed every check for its mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    mode: AccessMode,
}

impl ResolvedPath {
    /// Returns the canonical path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the mode this path was validated for.
    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }
}

/// Validates paths against the size cap and the sandbox.
#[derive(Debug, Clone)]
pub struct SafeAccessor {
    sandbox: PathBuf,
    max_size: u64,
}

impl SafeAccessor {
    /// Creates an accessor whose writes are confined to `sandbox`.
    #[must_use]
    pub fn new(sandbox: impl Into<PathBuf>) -> Self {
        Self {
            sandbox: sandbox.into(),
            max_size: MAX_FILE_SIZE,
        }
    }

    /// Overrides the size cap.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Returns the sandbox directory.
    #[must_use]
    pub fn sandbox(&self) -> &Path {
        &self.sandbox
    }

    /// Checks `path` for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] naming the first failed check.
    pub fn resolve(&self, path: &Path, mode: AccessMode) -> Result<ResolvedPath, AccessDenied> {
        let deny = |reason| AccessDenied {
            path: path.to_path_buf(),
            reason,
        };

        let resolved = match mode {
            AccessMode::Read => self.resolve_read(path),
            AccessMode::Write => self.resolve_write(path),
        }
        .map_err(deny)?;

        debug!("Resolved {} for {:?}", resolved.display(), mode);
        Ok(ResolvedPath {
            path: resolved,
            mode,
        })
    }

    fn resolve_read(&self, path: &Path) -> Result<PathBuf, DenyReason> {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(DenyReason::Missing),
            Err(e) => return Err(DenyReason::Io(e.to_string())),
        };
        self.check_existing(&meta)?;

        File::open(path).map_err(|_| DenyReason::Unreadable)?;
        fs::canonicalize(path).map_err(|e| DenyReason::Io(e.to_string()))
    }

    fn resolve_write(&self, path: &Path) -> Result<PathBuf, DenyReason> {
        match fs::symlink_metadata(path) {
            Ok(meta) => self.check_existing(&meta)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(DenyReason::Io(e.to_string())),
        }

        let file_name = path.file_name().ok_or(DenyReason::NotRegularFile)?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let parent_meta = fs::metadata(parent).map_err(|_| DenyReason::ParentNotWritable)?;
        if !parent_meta.is_dir() {
            return Err(DenyReason::ParentNotWritable);
        }

        let parent = fs::canonicalize(parent).map_err(|e| DenyReason::Io(e.to_string()))?;
        let sandbox = fs::canonicalize(&self.sandbox).map_err(|_| DenyReason::OutsideSandbox)?;
        if !parent.starts_with(&sandbox) {
            return Err(DenyReason::OutsideSandbox);
        }

        // Mode bits say nothing about the current user; creating an
        // unnamed temp file is the same operation write_atomic relies on.
        tempfile::tempfile_in(&parent).map_err(|e| {
            debug!("Parent {} not writable: {}", parent.display(), e);
            DenyReason::ParentNotWritable
        })?;

        Ok(parent.join(file_name))
    }

    fn check_existing(&self, meta: &fs::Metadata) -> Result<(), DenyReason> {
        if meta.file_type().is_symlink() {
            return Err(DenyReason::Symlink);
        }
        if !meta.is_file() {
            return Err(DenyReason::NotRegularFile);
        }
        if meta.len() > self.max_size {
            return Err(DenyReason::TooLarge {
                size: meta.len(),
                limit: self.max_size,
            });
        }
        Ok(())
    }

    /// Reads a resolved file, refusing to go past the size cap.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails or the file grew past the cap.
    pub fn read_bytes(&self, resolved: &ResolvedPath) -> io::Result<Vec<u8>> {
        let file = File::open(resolved.path())?;
        let mut bytes = Vec::new();
        file.take(self.max_size + 1).read_to_end(&mut bytes)?;
        if bytes.len() as u64 > self.max_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file exceeds {} bytes", self.max_size),
            ));
        }
        Ok(bytes)
    }

    /// Replaces a resolved file atomically: the old content stays in place
    /// unless the new content is fully written.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the path was not resolved for writing or the
    /// temporary file cannot be written or renamed.
    pub fn write_atomic(&self, resolved: &ResolvedPath, bytes: &[u8]) -> io::Result<()> {
        if resolved.mode() != AccessMode::Write {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "path was not resolved for writing",
            ));
        }
        let dir = resolved.path().parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(resolved.path()).map_err(|e| e.error)?;
        Ok(())
    }
}
