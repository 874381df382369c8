//! Error type for line-level operations.

use core::fmt;

/// Failure of a line-level read or edit.
///
/// `E` is the error type of the underlying [`Store`](platform::Store).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError<E> {
    /// The line does not exist, or the column is past the end of the line.
    OutOfRange,
    /// The byte range is inverted, extends past the end of the store, or
    /// would grow the store beyond `u32::MAX` bytes.
    InvalidRange,
    /// The store rejected a seek, read, write, truncate or sync.
    Store(E),
}

impl<E> LineError<E> {
    /// `true` for [`LineError::Store`].
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl<E> From<E> for LineError<E> {
    fn from(e: E) -> Self {
        Self::Store(e)
    }
}

impl<E: fmt::Display> fmt::Display for LineError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => f.write_str("line or column out of range"),
            Self::InvalidRange => f.write_str("invalid byte range"),
            Self::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display> std::error::Error for LineError<E> {}
