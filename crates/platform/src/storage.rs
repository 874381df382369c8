//! Byte-store abstraction for files and buffers.
//!
//! A [`Store`] is a random-access byte sequence with a single read/write
//! cursor, modelled on the FAT filesystem file API the firmware uses on the
//! SD card. Everything above this layer (line indexing, settings files) is
//! generic over the trait so that the same code runs against an SD card file,
//! a host file (`storage_local`) or an in-memory mock (`mocks`).
//!
//! # Contract
//!
//! | Method | Semantics |
//! |--------|-----------|
//! | `size()` | Current length in bytes |
//! | `seek(offset)` | Move the cursor, return the previous position |
//! | `read(buf)` | Read up to `buf.len()` bytes; a short read means EOF |
//! | `write(buf)` | Write at the cursor, growing the store if needed |
//! | `truncate()` | Cut the store at the cursor |
//! | `sync()` | Flush pending writes |
//!
//! Seeking past `size()` is legal; a following `write` grows the store. How
//! the gap is filled is up to the implementation.
//!
//! No atomicity is promised across calls: a sequence of seek/read/write that
//! fails half-way leaves the store in whatever state the completed calls
//! produced.

/// Absolute byte offset into a [`Store`].
pub type Offset = u32;

/// Byte length of a [`Store`].
pub type Size = u32;

/// Generic failure classification for stores without a richer error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The requested cursor position is not valid for this store.
    #[error("invalid seek offset")]
    BadSeek,
    /// The medium reported a read, write or flush failure.
    #[error("store I/O failure")]
    Io,
    /// The store cannot grow any further.
    #[error("store is full")]
    Full,
}

/// Random-access byte store with a single cursor.
pub trait Store {
    /// Error type
    type Error: core::fmt::Debug;

    /// Current length in bytes.
    fn size(&self) -> Size;

    /// Move the cursor to `offset` and return the previous cursor position.
    fn seek(&mut self, offset: Offset) -> Result<Offset, Self::Error>;

    /// Read up to `buf.len()` bytes at the cursor and advance it.
    ///
    /// Returns the number of bytes read; `0` (or any short count) at EOF is
    /// not an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `buf` at the cursor, growing the store if necessary.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;

    /// Truncate the store at the cursor. Returns the new size.
    fn truncate(&mut self) -> Result<Offset, Self::Error>;

    /// Flush pending writes to the medium.
    fn sync(&mut self) -> Result<(), Self::Error>;
}

impl<S: Store + ?Sized> Store for &mut S {
    type Error = S::Error;

    fn size(&self) -> Size {
        (**self).size()
    }

    fn seek(&mut self, offset: Offset) -> Result<Offset, Self::Error> {
        (**self).seek(offset)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(buf)
    }

    fn truncate(&mut self) -> Result<Offset, Self::Error> {
        (**self).truncate()
    }

    fn sync(&mut self) -> Result<(), Self::Error> {
        (**self).sync()
    }
}

/// Read into `buf` until it is full or the store reports EOF.
///
/// Returns the number of bytes actually read (less than `buf.len()` only at
/// EOF).
pub fn read_up_to<S: Store + ?Sized>(store: &mut S, buf: &mut [u8]) -> Result<usize, S::Error> {
    let mut pos = 0;
    while pos < buf.len() {
        // SAFETY: pos < buf.len() so buf[pos..] is a valid non-empty slice.
        #[allow(clippy::indexing_slicing)]
        let n = store.read(&mut buf[pos..])?;
        if n == 0 {
            break;
        }
        pos = pos.saturating_add(n);
    }
    Ok(pos)
}

/// Write all of `buf`, retrying on short writes.
///
/// Returns the number of bytes written; this is less than `buf.len()` only
/// when the store stops accepting data (a zero-length write).
pub fn write_all<S: Store + ?Sized>(store: &mut S, buf: &[u8]) -> Result<usize, S::Error> {
    let mut pos = 0;
    while pos < buf.len() {
        // SAFETY: pos < buf.len() so buf[pos..] is a valid non-empty slice.
        #[allow(clippy::indexing_slicing)]
        let n = store.write(&buf[pos..])?;
        if n == 0 {
            break;
        }
        pos = pos.saturating_add(n);
    }
    Ok(pos)
}
