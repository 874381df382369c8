//! Local filesystem `Store` implementation for the desktop emulator and host
//! tools.
//!
//! `LocalFile` implements [`Store`] over `std::fs::File`. Used when the `std`
//! feature is enabled (emulator builds and xtask only).

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::storage::{Offset, Size, Store};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub enum LocalStorageError {
    /// Underlying filesystem error.
    Io(std::io::Error),
    /// The file is larger than the 32-bit offset range supported by [`Store`].
    TooLarge(u64),
}

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "local storage error: {e}"),
            Self::TooLarge(len) => write!(f, "file too large: {len} bytes"),
        }
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::TooLarge(_) => None,
        }
    }
}

impl From<std::io::Error> for LocalStorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// An open read/write file on the local filesystem.
///
/// The size is tracked locally so that [`Store::size`] stays a cheap,
/// infallible call, matching the FAT file object on hardware.
#[derive(Debug)]
pub struct LocalFile {
    inner: fs::File,
    size: Size,
    cursor: Offset,
}

impl LocalFile {
    /// Open an existing file for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns `LocalStorageError::Io` if the file cannot be opened and
    /// `LocalStorageError::TooLarge` if it does not fit the 32-bit offset range.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LocalStorageError> {
        let inner = fs::OpenOptions::new().read(true).write(true).open(path)?;
        Self::from_file(inner)
    }

    /// Open a file for reading and writing, creating it if it does not exist.
    ///
    /// Existing contents are kept.
    ///
    /// # Errors
    ///
    /// Same as [`LocalFile::open`].
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self, LocalStorageError> {
        let inner = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Self::from_file(inner)
    }

    /// Create (or truncate) a file for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns `LocalStorageError::Io` if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LocalStorageError> {
        let inner = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Self::from_file(inner)
    }

    fn from_file(inner: fs::File) -> Result<Self, LocalStorageError> {
        let len = inner.metadata()?.len();
        let size = Size::try_from(len).map_err(|_| LocalStorageError::TooLarge(len))?;
        Ok(Self {
            inner,
            size,
            cursor: 0,
        })
    }

    fn advance(&mut self, n: usize) -> Result<(), LocalStorageError> {
        let n = Offset::try_from(n).map_err(|_| LocalStorageError::TooLarge(n as u64))?;
        self.cursor = self
            .cursor
            .checked_add(n)
            .ok_or(LocalStorageError::TooLarge(u64::from(self.cursor)))?;
        Ok(())
    }
}

impl Store for LocalFile {
    type Error = LocalStorageError;

    fn size(&self) -> Size {
        self.size
    }

    fn seek(&mut self, offset: Offset) -> Result<Offset, Self::Error> {
        Seek::seek(&mut self.inner, SeekFrom::Start(u64::from(offset)))?;
        let previous = self.cursor;
        self.cursor = offset;
        Ok(previous)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = Read::read(&mut self.inner, buf)?;
        self.advance(n)?;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let n = Write::write(&mut self.inner, buf)?;
        self.advance(n)?;
        self.size = self.size.max(self.cursor);
        Ok(n)
    }

    fn truncate(&mut self) -> Result<Offset, Self::Error> {
        self.inner.set_len(u64::from(self.cursor))?;
        self.size = self.cursor;
        Ok(self.size)
    }

    fn sync(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()?;
        self.inner.sync_data()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::storage::read_up_to;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn local_file_read_full_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.txt");
        fs::write(&path, b"hello world").unwrap();
        let mut file = LocalFile::open(&path).unwrap();
        let mut buf = [0u8; 11];
        let n = read_up_to(&mut file, &mut buf).unwrap();
        assert_eq!(n, 11);
        assert_eq!(&buf, b"hello world");
    }

    #[test]
    fn local_file_size_matches() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("size.bin");
        fs::write(&path, [0u8; 64]).unwrap();
        let file = LocalFile::open(&path).unwrap();
        assert_eq!(file.size(), 64);
    }

    #[test]
    fn local_file_seek_and_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seek.txt");
        fs::write(&path, b"ABCDEFGH").unwrap();
        let mut file = LocalFile::open(&path).unwrap();
        assert_eq!(file.seek(4).unwrap(), 0);
        let mut buf = [0u8; 4];
        file.read(&mut buf).unwrap();
        assert_eq!(&buf, b"EFGH");
    }

    #[test]
    fn local_file_write_grows_and_truncate_shrinks() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("grow.txt");
        fs::write(&path, b"abc").unwrap();
        let mut file = LocalFile::open(&path).unwrap();
        file.seek(3).unwrap();
        file.write(b"def").unwrap();
        assert_eq!(file.size(), 6);
        file.seek(2).unwrap();
        assert_eq!(file.truncate().unwrap(), 2);
        file.sync().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"ab");
    }

    #[test]
    fn local_file_create_truncates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("create.txt");
        fs::write(&path, b"old contents").unwrap();
        let file = LocalFile::create(&path).unwrap();
        assert_eq!(file.size(), 0);
    }

    #[test]
    fn local_file_open_or_create_keeps_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keep.txt");
        fs::write(&path, b"keep").unwrap();
        assert_eq!(LocalFile::open_or_create(&path).unwrap().size(), 4);
        let fresh = tmp.path().join("fresh.txt");
        assert_eq!(LocalFile::open_or_create(&fresh).unwrap().size(), 0);
    }

    #[test]
    fn local_file_open_missing_returns_err() {
        let tmp = TempDir::new().unwrap();
        let err = LocalFile::open(tmp.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, LocalStorageError::Io(_)));
        assert!(err.to_string().starts_with("local storage error"));
    }
}
