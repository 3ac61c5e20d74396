//! I/O error types.

use std::io;
use std::path::PathBuf;

use crate::backend::OpenMode;

/// Errors from a file backend.
///
/// Every variant is constructed at exactly one detection site, where it is
/// also logged; there is no blanket conversion from [`std::io::Error`].
/// Short transfers are unconditionally fatal to the operation and are never
/// retried or reported as partial success.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The OS refused to open the path.
    #[error("cannot open {path} for {mode}: {source}")]
    Open {
        path: PathBuf,
        mode: OpenMode,
        source: io::Error,
    },

    /// The backend already holds an open handle.
    ///
    /// The state machine has no open-to-open transition; `mode` is the mode
    /// the backend is currently open for.
    #[error("backend is already open for {mode}")]
    AlreadyOpen { mode: OpenMode },

    /// The operation requires an open handle, or `close` was called twice.
    #[error("backend is closed")]
    Closed,

    /// The waited operation contradicts the mode the backend was opened for.
    #[error("operation requires {required} mode but backend is open for {actual}")]
    WrongMode {
        required: OpenMode,
        actual: OpenMode,
    },

    /// The positioned read failed at the OS level.
    #[error("read of {len} bytes at offset {offset} failed: {source}")]
    Read {
        offset: u64,
        len: usize,
        source: io::Error,
    },

    /// Fewer bytes were read than requested.
    ///
    /// The destination buffer holds the `got` transferred bytes; its
    /// contents beyond that are unspecified (never zero-filled here).
    #[error("short read at offset {offset}: wanted {wanted} bytes, got {got}")]
    ShortRead {
        offset: u64,
        wanted: usize,
        got: usize,
    },

    /// The positioned write failed at the OS level.
    #[error("write of {len} bytes at offset {offset} failed: {source}")]
    Write {
        offset: u64,
        len: usize,
        source: io::Error,
    },

    /// Fewer bytes were written than requested.
    #[error("short write at offset {offset}: wanted {wanted} bytes, got {got}")]
    ShortWrite {
        offset: u64,
        wanted: usize,
        got: usize,
    },

    /// The file-status query failed.
    #[error("cannot query file size: {source}")]
    Size { source: io::Error },

    /// Flushing data to the medium failed.
    #[error("cannot sync file: {source}")]
    Sync { source: io::Error },
}
