//! # strata-io: positioned file I/O backends for the Strata codec
//!
//! The Strata codec decodes and encodes its layered binary format by
//! absolute byte offset. This crate is the platform file-access layer
//! underneath it: a [`FileBackend`] contract built around a two-phase
//! submit/wait protocol, so the codec can issue positioned transfers
//! without knowing whether the backing medium completes them synchronously
//! or overlapped.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │       strata codec       │
//! │   (uses FileBackend)     │
//! └────────────┬─────────────┘
//!              │
//! ┌────────────┴─────────────┐
//! │        strata-io         │
//! │  ┌─────────┐ ┌─────────┐ │
//! │  │ Native  │ │ Memory  │ │
//! │  │ Backend │ │ Backend │ │
//! │  └─────────┘ └─────────┘ │
//! └──────────────────────────┘
//! ```
//!
//! # Protocol
//!
//! Submission captures the transfer parameters in a [`ReadOperation`] or
//! [`WriteOperation`] and performs no I/O; the matching wait call blocks
//! until the transfer is guaranteed complete and consumes the descriptor. A
//! short transfer is a hard failure; the codec never sees partially
//! transferred data reported as success. [`NativeBackend`], the reference
//! backend, performs the entire transfer inside the wait call; the two-call
//! shape exists so an overlapped backend can slot in later without changing
//! callers.
//!
//! Because descriptors borrow the caller's buffers, the protocol's
//! ownership rules are compiler-enforced: a buffer cannot move or be
//! touched while its operation is outstanding, and a descriptor cannot be
//! waited on twice.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use strata_io::{FileBackend, MemoryBackend};
//!
//! fn main() -> Result<(), strata_io::FileError> {
//!     let mut file = MemoryBackend::new();
//!
//!     file.open_write(Path::new("scratch.strata"))?;
//!     let op = file.submit_write(b"layer data", 0);
//!     file.wait_for_write(op)?;
//!     file.close()?;
//!
//!     file.open_read(Path::new("scratch.strata"))?;
//!     let mut header = [0u8; 5];
//!     let op = file.submit_read(&mut header, 0);
//!     file.wait_for_read(op)?;
//!     assert_eq!(&header, b"layer");
//!     file.close()?;
//!     Ok(())
//! }
//! ```

mod backend;
mod error;
mod memory;
mod native;
mod operation;

pub use backend::{FileBackend, OpenMode};
pub use error::FileError;
pub use memory::MemoryBackend;
pub use native::NativeBackend;
pub use operation::{ReadOperation, WriteOperation};
