//! In-memory backend.
//!
//! [`MemoryBackend`] implements the [`FileBackend`] contract over a
//! `Vec<u8>` medium: decoding embedded assets, encoding into memory, and
//! exercising the layers above without touching a filesystem. The medium
//! persists across open/close cycles within one instance the way a disk
//! file persists between opens.

use std::io;
use std::path::Path;

use tracing::error;

use crate::backend::{FileBackend, OpenMode};
use crate::error::FileError;
use crate::operation::{ReadOperation, WriteOperation};

/// File backend over an in-memory byte buffer.
///
/// There is no path namespace, so the `path` argument to the open calls is
/// ignored and opening only fails on the open-to-open edge. Everything else
/// follows the shared contract: `open_write` truncates the medium, writes
/// past the end zero-fill the gap the way a sparse file would, short reads
/// are hard failures, and operations on a closed backend fail fast.
#[derive(Debug)]
pub struct MemoryBackend {
    data: Vec<u8>,
    mode: Option<OpenMode>,
}

impl MemoryBackend {
    /// Creates a closed backend with an empty medium.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            mode: None,
        }
    }

    /// Creates a closed backend whose medium already holds `contents`.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            data: contents.into(),
            mode: None,
        }
    }

    /// Current contents of the medium.
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the backend, returning the medium.
    pub fn into_contents(self) -> Vec<u8> {
        self.data
    }

    fn require(&self, required: OpenMode) -> Result<(), FileError> {
        match self.mode {
            None => {
                error!(required = %required, "operation on closed backend");
                Err(FileError::Closed)
            }
            Some(actual) if actual != required => {
                error!(required = %required, actual = %actual, "operation contradicts open mode");
                Err(FileError::WrongMode { required, actual })
            }
            Some(_) => Ok(()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FileBackend for MemoryBackend {
    fn open_read(&mut self, _path: &Path) -> Result<(), FileError> {
        if let Some(mode) = self.mode {
            error!(current = %mode, "backend already open");
            return Err(FileError::AlreadyOpen { mode });
        }
        self.mode = Some(OpenMode::Read);
        Ok(())
    }

    fn open_write(&mut self, _path: &Path) -> Result<(), FileError> {
        if let Some(mode) = self.mode {
            error!(current = %mode, "backend already open");
            return Err(FileError::AlreadyOpen { mode });
        }
        // Truncation parity with the native backend's O_TRUNC.
        self.data.clear();
        self.mode = Some(OpenMode::Write);
        Ok(())
    }

    fn close(&mut self) -> Result<(), FileError> {
        if self.mode.take().is_none() {
            error!("close on a backend that is not open");
            return Err(FileError::Closed);
        }
        Ok(())
    }

    fn submit_read<'b>(&mut self, buffer: &'b mut [u8], offset: u64) -> ReadOperation<'b> {
        ReadOperation::new(buffer, offset)
    }

    fn wait_for_read(&mut self, operation: ReadOperation<'_>) -> Result<(), FileError> {
        self.require(OpenMode::Read)?;
        let (buffer, offset) = operation.into_parts();
        let wanted = buffer.len();

        let start = usize::try_from(offset)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        let got = wanted.min(self.data.len() - start);
        buffer[..got].copy_from_slice(&self.data[start..start + got]);

        if got < wanted {
            error!(offset, wanted, got, "short read");
            return Err(FileError::ShortRead { offset, wanted, got });
        }
        Ok(())
    }

    fn submit_write<'b>(&mut self, buffer: &'b [u8], offset: u64) -> WriteOperation<'b> {
        WriteOperation::new(buffer, offset)
    }

    fn wait_for_write(&mut self, operation: WriteOperation<'_>) -> Result<(), FileError> {
        self.require(OpenMode::Write)?;
        let (buffer, offset) = operation.into_parts();
        let wanted = buffer.len();

        // A zero-length positioned write never extends the medium.
        if wanted == 0 {
            return Ok(());
        }

        let range = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(wanted).map(|end| (start, end)));
        let Some((start, end)) = range else {
            error!(offset, len = wanted, "write range not addressable in memory");
            return Err(FileError::Write {
                offset,
                len: wanted,
                source: io::Error::new(io::ErrorKind::InvalidInput, "range not addressable"),
            });
        };

        if end > self.data.len() {
            // Sparse-file parity: the gap between the old end and `offset`
            // reads back as zeros.
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(buffer);
        Ok(())
    }

    fn size(&self) -> Result<u64, FileError> {
        if self.mode.is_none() {
            error!("operation on closed backend");
            return Err(FileError::Closed);
        }
        Ok(self.data.len() as u64)
    }

    fn sync(&mut self) -> Result<(), FileError> {
        if self.mode.is_none() {
            error!("operation on closed backend");
            return Err(FileError::Closed);
        }
        Ok(())
    }

    fn mode(&self) -> Option<OpenMode> {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_write_truncates_medium() {
        let mut backend = MemoryBackend::with_contents(b"previous".to_vec());
        backend.open_write(Path::new("ignored")).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        backend.close().unwrap();
    }

    #[test]
    fn medium_persists_across_open_close_cycles() {
        let mut backend = MemoryBackend::new();
        backend.open_write(Path::new("cycle")).unwrap();
        backend.write_all_at(b"kept", 0).unwrap();
        backend.close().unwrap();

        backend.open_read(Path::new("cycle")).unwrap();
        let mut buf = [0u8; 4];
        backend.read_exact_at(&mut buf, 0).unwrap();
        assert_eq!(&buf, b"kept");
        backend.close().unwrap();

        assert_eq!(backend.into_contents(), b"kept");
    }

    #[test]
    fn write_past_end_zero_fills_gap() {
        let mut backend = MemoryBackend::new();
        backend.open_write(Path::new("sparse")).unwrap();
        backend.write_all_at(b"zz", 4).unwrap();
        assert_eq!(backend.size().unwrap(), 6);
        assert_eq!(backend.contents(), &[0, 0, 0, 0, b'z', b'z']);
        backend.close().unwrap();
    }

    #[test]
    fn zero_length_write_does_not_extend() {
        let mut backend = MemoryBackend::new();
        backend.open_write(Path::new("zero")).unwrap();
        backend.write_all_at(&[], 1000).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        backend.close().unwrap();
    }

    #[test]
    fn read_only_medium_rejects_write_wait() {
        let mut backend = MemoryBackend::with_contents(b"data".to_vec());
        backend.open_read(Path::new("ro")).unwrap();
        let err = backend.write_all_at(b"nope", 0).unwrap_err();
        assert!(matches!(
            err,
            FileError::WrongMode {
                required: OpenMode::Write,
                actual: OpenMode::Read,
            }
        ));
        backend.close().unwrap();
    }
}
