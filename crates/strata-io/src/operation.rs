//! Operation descriptors for the submit/wait protocol.
//!
//! A descriptor captures the parameters of one submitted transfer: the
//! caller's buffer and the absolute byte offset in the file. Descriptors are
//! created by [`submit_read`]/[`submit_write`] and consumed **by value** by
//! the matching wait call, so a descriptor can neither be waited on twice
//! nor outlive the buffer it borrows. They are plain values; submission
//! allocates nothing.
//!
//! [`submit_read`]: crate::FileBackend::submit_read
//! [`submit_write`]: crate::FileBackend::submit_write

use std::fmt;

/// Descriptor for one submitted positioned read.
///
/// Borrows the destination buffer exclusively until
/// [`wait_for_read`](crate::FileBackend::wait_for_read) consumes the
/// descriptor, so the buffer cannot move or be aliased while the transfer
/// is outstanding. The transfer length is the buffer length.
pub struct ReadOperation<'buf> {
    buffer: &'buf mut [u8],
    offset: u64,
}

impl<'buf> ReadOperation<'buf> {
    /// Creates a descriptor reading `buffer.len()` bytes at `offset`.
    ///
    /// Normally obtained from
    /// [`submit_read`](crate::FileBackend::submit_read); public so that
    /// backends outside this crate can implement submission.
    pub fn new(buffer: &'buf mut [u8], offset: u64) -> Self {
        Self { buffer, offset }
    }

    /// Absolute byte offset the transfer starts at.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Transfer length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` for a zero-length transfer.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consumes the descriptor, releasing the buffer and offset to the
    /// backend completing the transfer.
    pub fn into_parts(self) -> (&'buf mut [u8], u64) {
        (self.buffer, self.offset)
    }
}

impl fmt::Debug for ReadOperation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOperation")
            .field("len", &self.buffer.len())
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// Descriptor for one submitted positioned write.
///
/// Borrows the source buffer until
/// [`wait_for_write`](crate::FileBackend::wait_for_write) consumes the
/// descriptor, so the data cannot change or go away while the transfer is
/// outstanding.
pub struct WriteOperation<'buf> {
    buffer: &'buf [u8],
    offset: u64,
}

impl<'buf> WriteOperation<'buf> {
    /// Creates a descriptor writing `buffer.len()` bytes at `offset`.
    ///
    /// Normally obtained from
    /// [`submit_write`](crate::FileBackend::submit_write).
    pub fn new(buffer: &'buf [u8], offset: u64) -> Self {
        Self { buffer, offset }
    }

    /// Absolute byte offset the transfer starts at.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Transfer length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` for a zero-length transfer.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consumes the descriptor, releasing the buffer and offset to the
    /// backend completing the transfer.
    pub fn into_parts(self) -> (&'buf [u8], u64) {
        (self.buffer, self.offset)
    }
}

impl fmt::Debug for WriteOperation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOperation")
            .field("len", &self.buffer.len())
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_descriptor_reports_parameters() {
        let mut buf = [0u8; 16];
        let op = ReadOperation::new(&mut buf, 42);
        assert_eq!(op.len(), 16);
        assert_eq!(op.offset(), 42);
        assert!(!op.is_empty());

        let (buffer, offset) = op.into_parts();
        assert_eq!(buffer.len(), 16);
        assert_eq!(offset, 42);
    }

    #[test]
    fn write_descriptor_reports_parameters() {
        let op = WriteOperation::new(b"strata", 7);
        assert_eq!(op.len(), 6);
        assert_eq!(op.offset(), 7);

        let (buffer, offset) = op.into_parts();
        assert_eq!(buffer, b"strata");
        assert_eq!(offset, 7);
    }

    #[test]
    fn debug_output_elides_buffer_contents() {
        let mut buf = vec![0xAA; 1024];
        let op = ReadOperation::new(&mut buf, 0);
        let rendered = format!("{op:?}");
        assert!(rendered.contains("len: 1024"));
        assert!(!rendered.contains("170")); // no byte dump
    }
}
