//! The file-access contract.
//!
//! [`FileBackend`] abstracts positioned file I/O behind a two-phase
//! submit/wait protocol so the codec above can issue transfers by absolute
//! byte offset without knowing how the backing medium completes them:
//!
//! - [`NativeBackend`](crate::NativeBackend) (reference): the whole transfer
//!   runs synchronously inside the wait call.
//! - A future overlapped backend (io_uring, IOCP) may begin the transfer at
//!   submission. Callers written against the synchronous backend stay
//!   correct, because cost and blocking are only ever attributed to wait.
//!
//! One backend instance owns at most one backing medium, exclusively, and is
//! a small state machine: closed on construction, open after a successful
//! [`open_read`](FileBackend::open_read) or
//! [`open_write`](FileBackend::open_write), closed again after
//! [`close`](FileBackend::close). There is no open-to-open transition.

use std::fmt;
use std::path::Path;

use crate::error::FileError;
use crate::operation::{ReadOperation, WriteOperation};

/// Access mode of an open backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Opened read-only.
    Read,
    /// Opened write-only.
    Write,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenMode::Read => f.write_str("read"),
            OpenMode::Write => f.write_str("write"),
        }
    }
}

/// Abstraction over positioned file access.
///
/// All methods take the backend exclusively (`&mut self`): a backend is
/// built for a single worker context per open file, and callers that share
/// one must serialize externally. The trait requires [`Send`] so a backend
/// can move to a worker thread, but not [`Sync`]; there is no shared-access
/// contract.
///
/// # Submit/wait
///
/// Submission captures the transfer parameters in a descriptor and performs
/// no I/O and no allocation; it cannot fail and does not consult the open
/// state. The matching wait consumes the descriptor, blocks until the
/// transfer is guaranteed complete, and reports the result. A transfer that
/// moves fewer bytes than requested is a hard failure with no retry.
/// Because the descriptor borrows the caller's buffer, the buffer is
/// immovable and (for reads) unaliased until the wait returns.
///
/// There is no cancellation and no timeout; a wait runs to completion or
/// failure.
pub trait FileBackend: Send {
    /// Opens the named path for read-only access.
    ///
    /// On failure the backend is left closed (no state change); if the
    /// backend is already open the call fails with
    /// [`FileError::AlreadyOpen`] and the current handle is untouched.
    fn open_read(&mut self, path: &Path) -> Result<(), FileError>;

    /// Opens the named path for write-only access, creating the file if
    /// absent and truncating it if present.
    ///
    /// On creation the file gets owner-read/write and group-read permission
    /// bits (unix; elsewhere the platform default applies). Failure contract
    /// as [`open_read`](Self::open_read).
    fn open_write(&mut self, path: &Path) -> Result<(), FileError>;

    /// Closes the backend, releasing the backing medium.
    ///
    /// Closing a backend that is not open is an error; idempotent close is
    /// not part of the contract, and calling `close` twice returns
    /// [`FileError::Closed`] the second time.
    fn close(&mut self) -> Result<(), FileError>;

    /// Submits a positioned read of `buffer.len()` bytes at `offset`.
    ///
    /// Returns the descriptor unconditionally; any problem (closed backend,
    /// wrong mode, I/O failure) surfaces at
    /// [`wait_for_read`](Self::wait_for_read).
    fn submit_read<'b>(&mut self, buffer: &'b mut [u8], offset: u64) -> ReadOperation<'b>;

    /// Blocks until the submitted read is complete.
    ///
    /// On success the buffer holds exactly `len` bytes read from `offset`.
    /// A short read fails with [`FileError::ShortRead`]; the buffer then
    /// holds only the transferred prefix and its remainder is unspecified.
    /// Fails fast with [`FileError::Closed`] or [`FileError::WrongMode`]
    /// before any I/O when the open state does not permit reading.
    fn wait_for_read(&mut self, operation: ReadOperation<'_>) -> Result<(), FileError>;

    /// Submits a positioned write of `buffer.len()` bytes at `offset`.
    ///
    /// Same contract as [`submit_read`](Self::submit_read).
    fn submit_write<'b>(&mut self, buffer: &'b [u8], offset: u64) -> WriteOperation<'b>;

    /// Blocks until the submitted write is complete.
    ///
    /// Writes exactly `len` bytes at `offset`; a positioned write past the
    /// current end extends the medium, zero-filling any gap. A short write
    /// fails with [`FileError::ShortWrite`]. Fails fast with
    /// [`FileError::Closed`] or [`FileError::WrongMode`] when the open state
    /// does not permit writing.
    fn wait_for_write(&mut self, operation: WriteOperation<'_>) -> Result<(), FileError>;

    /// Current size of the open medium in bytes, from the file-status query
    /// (not from seeking), so it stays correct for sparse files.
    ///
    /// Valid in either open mode; [`FileError::Closed`] when closed.
    fn size(&self) -> Result<u64, FileError>;

    /// Flushes written data (and metadata) to the medium.
    ///
    /// [`FileError::Closed`] when closed.
    fn sync(&mut self) -> Result<(), FileError>;

    /// The mode the backend is currently open for, or `None` when closed.
    fn mode(&self) -> Option<OpenMode>;

    /// Returns `true` while the backend holds an open medium.
    fn is_open(&self) -> bool {
        self.mode().is_some()
    }

    /// Reads exactly `buffer.len()` bytes at `offset`.
    ///
    /// Exactly a [`submit_read`](Self::submit_read) followed by its wait:
    /// one transfer attempt with the same failure taxonomy, no retry loop.
    fn read_exact_at(&mut self, buffer: &mut [u8], offset: u64) -> Result<(), FileError> {
        let operation = self.submit_read(buffer, offset);
        self.wait_for_read(operation)
    }

    /// Writes all of `buffer` at `offset`.
    ///
    /// Exactly a [`submit_write`](Self::submit_write) followed by its wait.
    fn write_all_at(&mut self, buffer: &[u8], offset: u64) -> Result<(), FileError> {
        let operation = self.submit_write(buffer, offset);
        self.wait_for_write(operation)
    }
}
