//! Mock implementations for testing
//!
//! This module provides an in-memory [`Store`] for unit and integration
//! tests, with switches to inject the failures a real SD card can produce.

#![cfg(any(test, feature = "std"))]

use std::vec::Vec;

use crate::storage::{Offset, Size, Store, StoreError};

/// In-memory byte store.
///
/// Seeking past the end is allowed; a write there zero-fills the gap, like
/// a FAT file. Reads past the end return `0`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Vec<u8>,
    cursor: Offset,
    max_size: Option<Size>,
    fail_reads: bool,
    fail_writes: bool,
    sync_count: usize,
}

impl MemoryStore {
    /// Create a store holding `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// Limit the store to `max_size` bytes: seeking past it fails with
    /// [`StoreError::BadSeek`] and writing past it with [`StoreError::Full`].
    #[must_use]
    pub fn with_max_size(mut self, max_size: Size) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Make every subsequent `read` fail with [`StoreError::Io`].
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every subsequent `write` fail with [`StoreError::Io`].
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Current contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Current contents as text (lossy).
    pub fn to_string_lossy(&self) -> std::string::String {
        std::string::String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Current cursor position.
    pub fn position(&self) -> Offset {
        self.cursor
    }

    /// Number of successful `sync()` calls.
    pub fn sync_count(&self) -> usize {
        self.sync_count
    }

    fn cursor_index(&self) -> usize {
        // Offset is u32; usize is at least 32 bits on every supported target.
        #[allow(clippy::cast_possible_truncation)]
        let index = self.cursor as usize;
        index
    }
}

impl From<&str> for MemoryStore {
    fn from(data: &str) -> Self {
        Self::new(data.as_bytes())
    }
}

impl Store for MemoryStore {
    type Error = StoreError;

    fn size(&self) -> Size {
        Size::try_from(self.data.len()).unwrap_or(Size::MAX)
    }

    fn seek(&mut self, offset: Offset) -> Result<Offset, Self::Error> {
        if self.max_size.is_some_and(|max| offset > max) {
            return Err(StoreError::BadSeek);
        }
        let previous = self.cursor;
        self.cursor = offset;
        Ok(previous)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(StoreError::Io);
        }
        let start = self.cursor_index();
        let Some(available) = self.data.get(start..) else {
            return Ok(0);
        };
        let n = buf.len().min(available.len());
        // SAFETY: n <= buf.len() and n <= available.len().
        #[allow(clippy::indexing_slicing)]
        buf[..n].copy_from_slice(&available[..n]);
        let advance = Offset::try_from(n).map_err(|_| StoreError::Io)?;
        self.cursor = self.cursor.saturating_add(advance);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(StoreError::Io);
        }
        let len = Offset::try_from(buf.len()).map_err(|_| StoreError::Full)?;
        let end = self.cursor.checked_add(len).ok_or(StoreError::Full)?;
        if self.max_size.is_some_and(|max| end > max) {
            return Err(StoreError::Full);
        }

        let start = self.cursor_index();
        let end_index = start.saturating_add(buf.len());
        if self.data.len() < end_index {
            self.data.resize(end_index, 0);
        }
        // SAFETY: data was resized to at least end_index above.
        #[allow(clippy::indexing_slicing)]
        self.data[start..end_index].copy_from_slice(buf);
        self.cursor = end;
        Ok(buf.len())
    }

    fn truncate(&mut self) -> Result<Offset, Self::Error> {
        let at = self.cursor_index();
        if at < self.data.len() {
            self.data.truncate(at);
        }
        Ok(self.size())
    }

    fn sync(&mut self) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(StoreError::Io);
        }
        self.sync_count = self.sync_count.saturating_add(1);
        Ok(())
    }
}
