//! Reference backend over the platform's native file handle.
//!
//! [`NativeBackend`] is the default, synchronous implementation of the
//! [`FileBackend`] contract: submission only captures parameters, and the
//! whole transfer runs inside the wait call using one positioned syscall
//! (`pread`/`pwrite` on unix, `seek_read`/`seek_write` on windows). Code
//! written against it must therefore never assume submit and wait overlap,
//! only that blocking happens in wait.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::error;

use crate::backend::{FileBackend, OpenMode};
use crate::error::FileError;
use crate::operation::{ReadOperation, WriteOperation};

/// Owner-read/write and group-read bits applied when `open_write` creates a
/// file.
#[cfg(unix)]
const CREATE_MODE: u32 = 0o640;

/// An open native file plus the context retained for failure reporting.
#[derive(Debug)]
struct OpenFile {
    file: File,
    mode: OpenMode,
    path: PathBuf,
}

/// Synchronous file backend over [`std::fs::File`].
///
/// Constructed closed; one instance owns at most one OS handle at a time
/// and never shares it. Dropping an open backend releases the handle
/// through [`File`]'s own drop, but orderly callers close explicitly;
/// `close` is also where a double close is caught and reported.
#[derive(Debug)]
pub struct NativeBackend {
    state: Option<OpenFile>,
}

impl NativeBackend {
    /// Creates a closed backend.
    pub fn new() -> Self {
        Self { state: None }
    }

    fn open(
        &mut self,
        path: &Path,
        mode: OpenMode,
        options: &OpenOptions,
    ) -> Result<(), FileError> {
        if let Some(open) = &self.state {
            error!(
                path = %path.display(),
                requested = %mode,
                current = %open.mode,
                "backend already open"
            );
            return Err(FileError::AlreadyOpen { mode: open.mode });
        }
        match options.open(path) {
            Ok(file) => {
                self.state = Some(OpenFile {
                    file,
                    mode,
                    path: path.to_path_buf(),
                });
                Ok(())
            }
            Err(source) => {
                error!(path = %path.display(), mode = %mode, error = %source, "cannot open file");
                Err(FileError::Open {
                    path: path.to_path_buf(),
                    mode,
                    source,
                })
            }
        }
    }

    /// Returns the open state, failing (and logging) when the backend is
    /// closed.
    fn open_state(&self) -> Result<&OpenFile, FileError> {
        match &self.state {
            Some(open) => Ok(open),
            None => {
                error!("operation on closed backend");
                Err(FileError::Closed)
            }
        }
    }

    /// As [`Self::open_state`], additionally requiring the given mode.
    fn require(&self, required: OpenMode) -> Result<&OpenFile, FileError> {
        let open = self.open_state()?;
        if open.mode == required {
            Ok(open)
        } else {
            error!(
                path = %open.path.display(),
                required = %required,
                actual = %open.mode,
                "operation contradicts open mode"
            );
            Err(FileError::WrongMode {
                required,
                actual: open.mode,
            })
        }
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FileBackend for NativeBackend {
    fn open_read(&mut self, path: &Path) -> Result<(), FileError> {
        let mut options = OpenOptions::new();
        options.read(true);
        self.open(path, OpenMode::Read, &options)
    }

    fn open_write(&mut self, path: &Path) -> Result<(), FileError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(CREATE_MODE);
        }

        self.open(path, OpenMode::Write, &options)
    }

    fn close(&mut self) -> Result<(), FileError> {
        match self.state.take() {
            Some(open) => {
                // Dropping the handle closes it; std exposes no close result.
                drop(open);
                Ok(())
            }
            None => {
                error!("close on a backend that is not open");
                Err(FileError::Closed)
            }
        }
    }

    fn submit_read<'b>(&mut self, buffer: &'b mut [u8], offset: u64) -> ReadOperation<'b> {
        ReadOperation::new(buffer, offset)
    }

    fn wait_for_read(&mut self, operation: ReadOperation<'_>) -> Result<(), FileError> {
        let open = self.require(OpenMode::Read)?;
        let (buffer, offset) = operation.into_parts();
        let wanted = buffer.len();

        let got = read_at(&open.file, buffer, offset).map_err(|source| {
            error!(
                path = %open.path.display(),
                offset,
                len = wanted,
                error = %source,
                "positioned read failed"
            );
            FileError::Read {
                offset,
                len: wanted,
                source,
            }
        })?;

        if got < wanted {
            error!(path = %open.path.display(), offset, wanted, got, "short read");
            return Err(FileError::ShortRead { offset, wanted, got });
        }
        Ok(())
    }

    fn submit_write<'b>(&mut self, buffer: &'b [u8], offset: u64) -> WriteOperation<'b> {
        WriteOperation::new(buffer, offset)
    }

    fn wait_for_write(&mut self, operation: WriteOperation<'_>) -> Result<(), FileError> {
        let open = self.require(OpenMode::Write)?;
        let (buffer, offset) = operation.into_parts();
        let wanted = buffer.len();

        let got = write_at(&open.file, buffer, offset).map_err(|source| {
            error!(
                path = %open.path.display(),
                offset,
                len = wanted,
                error = %source,
                "positioned write failed"
            );
            FileError::Write {
                offset,
                len: wanted,
                source,
            }
        })?;

        if got < wanted {
            error!(path = %open.path.display(), offset, wanted, got, "short write");
            return Err(FileError::ShortWrite { offset, wanted, got });
        }
        Ok(())
    }

    fn size(&self) -> Result<u64, FileError> {
        let open = self.open_state()?;
        match open.file.metadata() {
            Ok(metadata) => Ok(metadata.len()),
            Err(source) => {
                error!(path = %open.path.display(), error = %source, "file status query failed");
                Err(FileError::Size { source })
            }
        }
    }

    fn sync(&mut self) -> Result<(), FileError> {
        let open = self.open_state()?;
        if let Err(source) = open.file.sync_all() {
            error!(path = %open.path.display(), error = %source, "sync failed");
            return Err(FileError::Sync { source });
        }
        Ok(())
    }

    fn mode(&self) -> Option<OpenMode> {
        self.state.as_ref().map(|open| open.mode)
    }
}

/// One positioned read, without moving any stream cursor the platform keeps.
fn read_at(file: &File, buffer: &mut [u8], offset: u64) -> std::io::Result<usize> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.read_at(buffer, offset)
    }

    #[cfg(not(unix))]
    {
        use std::os::windows::fs::FileExt;
        file.seek_read(buffer, offset)
    }
}

/// One positioned write.
fn write_at(file: &File, buffer: &[u8], offset: u64) -> std::io::Result<usize> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.write_at(buffer, offset)
    }

    #[cfg(not(unix))]
    {
        use std::os::windows::fs::FileExt;
        file.seek_write(buffer, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_write_then_size_reflects_written_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("size.strata");
        let mut backend = NativeBackend::new();

        backend.open_write(&path).unwrap();
        backend.write_all_at(b"twelve bytes", 0).unwrap();
        assert_eq!(backend.size().unwrap(), 12);
        backend.close().unwrap();
    }

    #[test]
    fn mode_tracks_state_machine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mode.strata");
        let mut backend = NativeBackend::new();
        assert_eq!(backend.mode(), None);

        backend.open_write(&path).unwrap();
        assert_eq!(backend.mode(), Some(OpenMode::Write));
        backend.close().unwrap();
        assert_eq!(backend.mode(), None);

        backend.open_read(&path).unwrap();
        assert_eq!(backend.mode(), Some(OpenMode::Read));
        backend.close().unwrap();
    }

    #[test]
    fn read_wait_on_write_handle_fails_without_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrong_mode.strata");
        let mut backend = NativeBackend::new();
        backend.open_write(&path).unwrap();

        let mut buf = [0u8; 4];
        let op = backend.submit_read(&mut buf, 0);
        let err = backend.wait_for_read(op).unwrap_err();
        assert!(matches!(
            err,
            FileError::WrongMode {
                required: OpenMode::Read,
                actual: OpenMode::Write,
            }
        ));
        backend.close().unwrap();
    }

    #[test]
    fn open_write_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncate.strata");
        let mut backend = NativeBackend::new();

        backend.open_write(&path).unwrap();
        backend.write_all_at(b"some longer contents", 0).unwrap();
        backend.close().unwrap();

        backend.open_write(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        backend.close().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn open_write_creates_with_owner_group_bits_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perms.strata");
        let mut backend = NativeBackend::new();
        backend.open_write(&path).unwrap();
        backend.close().unwrap();

        // The umask can clear creation bits but never add them, so only
        // bits within 0o640 may be set.
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777 & !CREATE_MODE, 0);
    }

    #[test]
    fn sync_flushes_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.strata");
        let mut backend = NativeBackend::new();

        backend.open_write(&path).unwrap();
        backend.write_all_at(b"durable", 0).unwrap();
        backend.sync().unwrap();
        backend.close().unwrap();

        assert!(matches!(backend.sync(), Err(FileError::Closed)));
    }
}
