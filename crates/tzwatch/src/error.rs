//! Error types for the tzwatch crate.
//!
//! This module provides the [`WatchError`] type for everything that can go
//! wrong while subscribing to or consuming time-zone updates.

use camino::{Utf8Path, Utf8PathBuf};

/// Errors that can occur while watching a time-zone symlink.
///
/// # Error Recovery Strategy
///
/// - **Setup errors** ([`WatchError::Notify`], [`WatchError::Io`],
///   [`WatchError::InvalidPath`]): fatal - returned synchronously from the
///   constructors; no watcher is produced.
/// - **Resolution errors** ([`WatchError::LinkRead`],
///   [`WatchError::NonUtf8Path`], [`WatchError::MalformedLink`],
///   [`WatchError::UnknownZone`]): transient - delivered on the watcher's
///   error channel; the event loop continues and the next filesystem event
///   is the only retry.
///
/// # Examples
///
/// ```
/// use tzwatch::WatchError;
/// use camino::Utf8PathBuf;
///
/// let error = WatchError::MalformedLink(Utf8PathBuf::from("New_York"));
/// assert!(error.is_transient());
/// assert!(error.to_string().contains("New_York"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to register or operate the filesystem notification backend.
    ///
    /// Only produced during construction; registration either succeeds or
    /// the watcher is never started.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// An I/O error occurred while canonicalizing the watched path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The watched path cannot name a symlink.
    #[error("invalid watch path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path.
        path: Utf8PathBuf,
        /// Explanation of why the path was rejected.
        reason: String,
    },

    /// The watched path could not be read as a symlink.
    ///
    /// Commonly transient: a non-atomic replacement removes the link before
    /// recreating it, and an event can be observed in between.
    #[error("failed to read symlink '{path}': {source}")]
    LinkRead {
        /// The path that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A symlink target is not valid UTF-8.
    ///
    /// Zone identifiers are UTF-8 strings, so a target that is not valid
    /// UTF-8 cannot name a zone.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// The symlink target has too few path segments to name a zone.
    ///
    /// A zone identifier has the form `Region/City`, so the target must
    /// contribute at least two segments.
    #[error("malformed symlink target '{0}': expected at least two path segments")]
    MalformedLink(Utf8PathBuf),

    /// The candidate identifier is not present in the time-zone database.
    #[error("unknown time zone '{0}'")]
    UnknownZone(String),
}

impl WatchError {
    /// Creates a new [`WatchError::InvalidPath`] error.
    #[inline]
    pub fn invalid_path(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new [`WatchError::LinkRead`] error.
    #[inline]
    pub fn link_read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::LinkRead {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error is transient (watching continues).
    ///
    /// Transient errors are delivered on the error channel and describe a
    /// single failed resolution; they say nothing about the next one.
    #[inline]
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::LinkRead { .. }
                | Self::NonUtf8Path(_)
                | Self::MalformedLink(_)
                | Self::UnknownZone(_)
        )
    }

    /// Returns `true` if this error is fatal (no watcher was produced).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_transient()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::InvalidPath { path, .. } | Self::LinkRead { path, .. } => Some(path.as_path()),
            Self::MalformedLink(path) => Some(path.as_path()),
            Self::Notify(_) | Self::Io(_) | Self::NonUtf8Path(_) | Self::UnknownZone(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_setup_errors_are_fatal() {
        let notify = WatchError::Notify(notify::Error::generic("inotify limit reached"));
        assert!(notify.is_fatal());
        assert!(!notify.is_transient());

        let io = WatchError::Io(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(io.is_fatal());

        let invalid = WatchError::invalid_path("/", "path has no file name");
        assert!(invalid.is_fatal());
    }

    #[test]
    fn test_resolution_errors_are_transient() {
        let read = WatchError::link_read(
            "/etc/localtime",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert!(read.is_transient());
        assert!(!read.is_fatal());

        let malformed = WatchError::MalformedLink(Utf8PathBuf::from("UTC"));
        assert!(malformed.is_transient());

        let unknown = WatchError::UnknownZone("Nowhere/Atlantis".to_owned());
        assert!(unknown.is_transient());

        let non_utf8 = WatchError::NonUtf8Path(std::path::PathBuf::from("weird"));
        assert!(non_utf8.is_transient());
    }

    #[test]
    fn test_link_read_display() {
        let error = WatchError::link_read(
            "/etc/localtime",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        let msg = error.to_string();
        assert!(msg.contains("/etc/localtime"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_malformed_link_display() {
        let error = WatchError::MalformedLink(Utf8PathBuf::from("New_York"));
        assert_eq!(
            error.to_string(),
            "malformed symlink target 'New_York': expected at least two path segments"
        );
    }

    #[test]
    fn test_unknown_zone_display() {
        let error = WatchError::UnknownZone("Nowhere/Atlantis".to_owned());
        assert_eq!(error.to_string(), "unknown time zone 'Nowhere/Atlantis'");
    }

    #[test]
    fn test_path_accessor() {
        let error = WatchError::invalid_path("/", "path has no file name");
        assert_eq!(error.path().map(Utf8Path::as_str), Some("/"));

        let error = WatchError::MalformedLink(Utf8PathBuf::from("UTC"));
        assert_eq!(error.path().map(Utf8Path::as_str), Some("UTC"));

        let error = WatchError::UnknownZone("Nowhere/Atlantis".to_owned());
        assert!(error.path().is_none());
    }
}
