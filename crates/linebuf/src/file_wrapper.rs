//! Line wrapper over a host file.

use std::path::Path;

use platform::storage_local::{LocalFile, LocalStorageError};

use crate::wrapper::{BufferWrapper, ProgressFn};

/// Cache window used for files.
pub const FILE_CACHE_SIZE: usize = 64;

/// [`BufferWrapper`] that owns a [`LocalFile`].
pub type FileWrapper = BufferWrapper<LocalFile, FILE_CACHE_SIZE>;

impl BufferWrapper<LocalFile, FILE_CACHE_SIZE> {
    /// Open `path` read/write and index it.
    ///
    /// With `create`, a missing file is created empty; existing contents are
    /// never truncated. `progress` receives the initial-scan and edit
    /// progress reports.
    pub fn open(
        path: impl AsRef<Path>,
        create: bool,
        progress: Option<ProgressFn>,
    ) -> Result<Self, LocalStorageError> {
        let path = path.as_ref();
        let file = if create {
            LocalFile::open_or_create(path)?
        } else {
            LocalFile::open(path)?
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), size = platform::Store::size(&file), "opening line file");

        Ok(Self::attach(file, progress))
    }

    /// The underlying file.
    pub fn file(&self) -> &LocalFile {
        self.store()
    }

    /// Replace the underlying file with the one at `path`, keeping the index.
    ///
    /// The new file must hold the same bytes as the current one; this is how
    /// an edit made on a temporary copy is committed without a rescan. On
    /// error the current file stays attached.
    pub fn assume_file(&mut self, path: impl AsRef<Path>) -> Result<LocalFile, LocalStorageError> {
        let file = LocalFile::open(path)?;
        Ok(self.swap_store(file))
    }
}
