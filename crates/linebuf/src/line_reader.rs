//! Sequential line access.
//!
//! [`Lines`] borrows a [`BufferWrapper`]; [`LineReader`] owns one built over
//! a store and can be rewound. Both yield each line as text with its
//! trailing newline kept, so callers strip `\n` (and `\r`) themselves.

use alloc::string::String;

use platform::Store;

use crate::config::DEFAULT_CACHE_SIZE;
use crate::wrapper::BufferWrapper;

/// Iterator over the lines of a [`BufferWrapper`].
///
/// Created by [`BufferWrapper::lines`]. Stops early if a line cannot be
/// resolved any more.
pub struct Lines<'a, S: Store, const N: usize> {
    wrapper: &'a mut BufferWrapper<S, N>,
    next: u32,
    end: u32,
}

impl<'a, S: Store, const N: usize> Lines<'a, S, N> {
    pub(crate) fn new(wrapper: &'a mut BufferWrapper<S, N>) -> Self {
        let end = wrapper.line_count();
        Self {
            wrapper,
            next: 0,
            end,
        }
    }
}

impl<S: Store, const N: usize> Iterator for Lines<'_, S, N> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        read_line(self.wrapper, &mut self.next, self.end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.end.saturating_sub(self.next)).unwrap_or(usize::MAX);
        (0, Some(left))
    }
}

/// Owning, rewindable line reader.
///
/// ```ignore
/// let mut reader = LineReader::new(store);
/// for line in &mut reader {
///     handle(line.trim_end());
/// }
/// reader.rewind();
/// ```
pub struct LineReader<S: Store, const N: usize = DEFAULT_CACHE_SIZE> {
    wrapper: BufferWrapper<S, N>,
    next: u32,
}

impl<S: Store, const N: usize> LineReader<S, N> {
    /// Index `store` and position the reader at line 0.
    pub fn new(store: S) -> Self {
        Self {
            wrapper: BufferWrapper::new(store),
            next: 0,
        }
    }

    /// Go back to line 0.
    pub fn rewind(&mut self) {
        self.next = 0;
    }

    /// Number of the line the next call to `next` returns.
    pub fn position(&self) -> u32 {
        self.next
    }

    /// Total number of lines.
    pub fn line_count(&self) -> u32 {
        self.wrapper.line_count()
    }

    /// Detach and return the store.
    pub fn into_inner(self) -> S {
        self.wrapper.into_inner()
    }
}

impl<S: Store, const N: usize> Iterator for LineReader<S, N> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let end = self.wrapper.line_count();
        read_line(&mut self.wrapper, &mut self.next, end)
    }
}

/// Number of lines in `store`, by the same rules as
/// [`BufferWrapper::line_count`].
pub fn count_lines<S: Store>(store: S) -> u32 {
    BufferWrapper::<S, 1>::new(store).line_count()
}

fn read_line<S: Store, const N: usize>(
    wrapper: &mut BufferWrapper<S, N>,
    next: &mut u32,
    end: u32,
) -> Option<String> {
    if *next >= end {
        return None;
    }
    let line = *next;
    let length = wrapper.line_length(line);
    let text = wrapper.get_text(line, 0, length)?;
    *next = line.saturating_add(1);
    Some(text)
}
