//! Line-indexed view over a [`Store`].
//!
//! [`BufferWrapper`] translates line numbers to byte ranges for stores far
//! larger than RAM. It keeps a sliding window of at most `N` newline offsets
//! (the "cache"), anchored by `start_line` (the line whose end is the first
//! cached entry) and `start_offset` (the byte where that line starts).
//!
//! # Line model
//!
//! | Store            | Lines                                         |
//! |------------------|-----------------------------------------------|
//! | `""`             | one synthetic line, range `{0, 1}`            |
//! | `"abc\ndef\n"`   | `{0, 4}`, `{4, 8}`                            |
//! | `"abc\ndef"`     | `{0, 4}`, `{4, 7}`; the last byte ends line 1 |
//!
//! A line's range includes its trailing `\n`. When the store does not end
//! with `\n`, its last byte is treated as the terminator of the final line.
//!
//! # Cache window
//!
//! A request for a line outside the window slides it: forward by scanning
//! for the next newline after the last cached one (evicting from the front),
//! backward by scanning for the newline before `start_offset - 1` (evicting
//! from the back). `line_count` is computed by one full scan when a store is
//! attached and afterwards only adjusted by edits.
//!
//! # Edits
//!
//! [`BufferWrapper::replace_range`] shifts the tail of the store in place and
//! rebuilds the window around the edit. The shift is not transactional: a
//! store failure mid-way leaves both the store and the index inconsistent,
//! and the only recovery is to re-attach the store with
//! [`BufferWrapper::set_buffer`].

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use core::fmt;

use platform::{read_up_to, write_all, Offset, Size, Store};

use crate::config::{DEFAULT_CACHE_SIZE, LINE_PROGRESS_INTERVAL, READ_ERROR_PLACEHOLDER};
use crate::error::LineError;
use crate::line_reader::Lines;
use crate::newline_ring::NewlineRing;
use crate::scan::{self, to_offset, to_usize};
use crate::shift;

/// Half-open byte range `[start, end)` in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ByteRange {
    /// First byte.
    pub start: Offset,
    /// One past the last byte.
    pub end: Offset,
}

impl ByteRange {
    /// Range `[start, end)`.
    pub const fn new(start: Offset, end: Offset) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered (0 for an inverted range).
    pub fn len(&self) -> Size {
        self.end.saturating_sub(self.start)
    }

    /// `true` when the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Progress callback: `(done, total)`.
///
/// During the initial scan `done` is the offset of the newline just counted
/// and `total` the store size; during an edit it is the number of tail bytes
/// moved so far out of the tail length.
pub type ProgressFn = Box<dyn FnMut(Size, Size)>;

/// Line-indexed wrapper around a [`Store`].
///
/// `N` is the number of newline offsets kept in the cache window.
pub struct BufferWrapper<S: Store, const N: usize = DEFAULT_CACHE_SIZE> {
    store: S,
    line_count: u32,
    start_line: u32,
    start_offset: Offset,
    newlines: NewlineRing<N>,
    on_read_progress: Option<ProgressFn>,
}

/// Wrap `store` with the default cache size.
///
/// Pass `&mut store` to keep ownership with the caller.
pub fn wrap_buffer<S: Store>(store: S) -> BufferWrapper<S> {
    BufferWrapper::new(store)
}

/// What a `replace_range` call changed, captured before the store is touched.
struct Edit<'a> {
    start: Offset,
    end: Offset,
    inserted: &'a [u8],
    old_size: Size,
    new_size: Size,
    /// `\n` bytes in the replaced range.
    removed: u32,
    /// `\n` bytes in `inserted`.
    added: u32,
    /// Store did not end with `\n` before the edit (or was empty).
    old_open: bool,
    /// Store does not end with `\n` after the edit (or is empty).
    new_open: bool,
}

impl<S: Store, const N: usize> BufferWrapper<S, N> {
    /// Attach `store` and index it.
    pub fn new(store: S) -> Self {
        Self::attach(store, None)
    }

    /// Attach `store` and index it, reporting progress to `progress` during
    /// the initial scan and during later edits.
    pub fn with_progress<F>(store: S, progress: F) -> Self
    where
        F: FnMut(Size, Size) + 'static,
    {
        Self::attach(store, Some(Box::new(progress)))
    }

    pub(crate) fn attach(store: S, on_read_progress: Option<ProgressFn>) -> Self {
        let mut wrapper = Self {
            store,
            line_count: 0,
            start_line: 0,
            start_offset: 0,
            newlines: NewlineRing::new(),
            on_read_progress,
        };
        wrapper.initialize();
        wrapper
    }

    /// Replace (or remove) the progress callback.
    pub fn set_progress_callback(&mut self, progress: Option<ProgressFn>) {
        self.on_read_progress = progress;
    }

    /// Attach a different store and rebuild the index. Returns the old store.
    pub fn set_buffer(&mut self, store: S) -> S {
        let old = core::mem::replace(&mut self.store, store);
        self.initialize();
        old
    }

    /// Swap in a store with identical contents without rescanning.
    #[cfg(feature = "std")]
    pub(crate) fn swap_store(&mut self, store: S) -> S {
        core::mem::replace(&mut self.store, store)
    }

    /// Detach and return the store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Shared access to the store. Mutating it behind the wrapper's back is
    /// not possible through this reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of lines (at least 1).
    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    /// Line number of the first cached entry.
    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    /// Size of the store in bytes.
    pub fn size(&self) -> Size {
        self.store.size()
    }

    /// Capacity of the cache window.
    pub const fn cache_size(&self) -> usize {
        N
    }

    fn initialize(&mut self) {
        self.line_count = 0;
        self.start_line = 0;
        self.start_offset = 0;
        self.newlines.clear();

        let size = self.store.size();
        let Some(last) = size.checked_sub(1) else {
            // Empty store: one synthetic line.
            self.line_count = 1;
            self.newlines.push_back(0);
            return;
        };

        let Self {
            store,
            line_count,
            newlines,
            on_read_progress,
            ..
        } = self;

        let scanned = scan::for_each_newline(&mut *store, |offset| {
            *line_count = line_count.saturating_add(1);
            let _ = newlines.try_push_back(offset);
            if line_count.checked_rem(LINE_PROGRESS_INTERVAL) == Some(0) {
                if let Some(cb) = on_read_progress.as_mut() {
                    cb(offset, size);
                }
            }
        });

        match scanned.and_then(|()| scan::byte_at(&mut *store, last)) {
            Ok(last_byte) => {
                if last_byte != Some(b'\n') {
                    *line_count = line_count.saturating_add(1);
                    let _ = newlines.try_push_back(last);
                }
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = ?_e, lines = *line_count, "line index incomplete");
                #[cfg(feature = "defmt")]
                defmt::warn!("line index incomplete after {=u32} lines", *line_count);
            }
        }

        if self.line_count == 0 {
            self.line_count = 1;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(size, lines = self.line_count, "store indexed");
        #[cfg(feature = "defmt")]
        defmt::debug!("store indexed: {=u32} bytes, {=u32} lines", size, self.line_count);
    }

    /// One past the last line number present in the window.
    fn window_end(&self) -> u32 {
        self.start_line.saturating_add(to_offset(self.newlines.len()))
    }

    /// Cache index holding the end of `line`, if `line` is in the window.
    ///
    /// Lines before the window wrap around to a huge index and are rejected
    /// by the same bounds check as lines after it.
    pub fn offset_for_line(&self, line: u32) -> Option<usize> {
        if line >= self.line_count {
            return None;
        }
        let index = usize::try_from(line.wrapping_sub(self.start_line)).ok()?;
        (index < self.newlines.len()).then_some(index)
    }

    /// Slide the window until `line` is cached, or until a scan fails.
    fn ensure_cached(&mut self, line: u32) {
        if line >= self.line_count {
            return;
        }
        let before = self.start_line;

        while line >= self.window_end() {
            let from = self
                .newlines
                .back()
                .map_or(self.start_offset, |nl| nl.saturating_add(1));
            let Some(nl) = scan::next_newline(&mut self.store, from) else {
                break;
            };
            if let Some(evicted) = self.newlines.push_back(nl) {
                self.start_offset = evicted.saturating_add(1);
                self.start_line = self.start_line.saturating_add(1);
            }
        }

        while line < self.start_line {
            let Some(newline) = self.start_offset.checked_sub(1) else {
                break;
            };
            let new_start = if self.start_line == 1 {
                0
            } else {
                let previous = newline
                    .checked_sub(1)
                    .and_then(|o| scan::previous_newline(&mut self.store, o));
                match previous {
                    Some(nl) => nl.saturating_add(1),
                    None => break,
                }
            };
            self.newlines.push_front(newline);
            self.start_line = self.start_line.saturating_sub(1);
            self.start_offset = new_start;
        }

        if self.start_line != before {
            window_moved(before, self.start_line);
        }
    }

    /// Byte range of `line`, including its trailing newline.
    ///
    /// Returns `None` for `line >= line_count()`.
    pub fn line_range(&mut self, line: u32) -> Option<ByteRange> {
        if line >= self.line_count {
            return None;
        }
        self.ensure_cached(line);
        let index = self.offset_for_line(line)?;
        let end = self.newlines.get(index)?.saturating_add(1);
        let start = match index.checked_sub(1) {
            None => self.start_offset,
            Some(prev) => self.newlines.get(prev)?.saturating_add(1),
        };
        Some(ByteRange::new(start, end))
    }

    /// Length of `line` in bytes, or 0 if it does not exist.
    pub fn line_length(&mut self, line: u32) -> Size {
        self.line_range(line).map_or(0, |r| r.len())
    }

    /// Absolute offset of column `col` of `line`.
    ///
    /// `col == line_length(line)` is the end-of-line position, where a cursor
    /// sits after the last character. `None` if the line does not exist or
    /// `col` is further out.
    pub fn get_offset(&mut self, line: u32, col: Offset) -> Option<Offset> {
        let range = self.line_range(line)?;
        range.start.checked_add(col).filter(|&o| o <= range.end)
    }

    /// Read up to `out.len()` bytes of `line` starting at column `col`.
    ///
    /// The read never crosses into the next line. Returns the number of
    /// bytes copied, which is 0 when `col` is at or past the end of the line.
    pub fn get_text_into(
        &mut self,
        line: u32,
        col: Offset,
        out: &mut [u8],
    ) -> Result<usize, LineError<S::Error>> {
        let range = self.line_range(line).ok_or(LineError::OutOfRange)?;
        let Some(start) = range.start.checked_add(col) else {
            return Ok(0);
        };
        let end = range.end.min(self.store.size());
        let len = to_usize(end.saturating_sub(start)).min(out.len());
        if len == 0 {
            return Ok(0);
        }
        self.store.seek(start)?;
        let buf = out.get_mut(..len).unwrap_or(&mut []);
        Ok(read_up_to(&mut self.store, buf)?)
    }

    /// Up to `length` bytes of `line` from column `col`, as text.
    ///
    /// `None` if the line does not exist. Invalid UTF-8 is replaced. When the
    /// store fails the read, [`READ_ERROR_PLACEHOLDER`] is returned instead
    /// of an error, which lets a UI keep drawing the remaining lines.
    pub fn get_text(&mut self, line: u32, col: Offset, length: Size) -> Option<String> {
        let range = self.line_range(line)?;
        let available = range
            .end
            .min(self.store.size())
            .saturating_sub(range.start.saturating_add(col));
        let mut buf = vec![0u8; to_usize(available.min(length))];
        match self.get_text_into(line, col, &mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Some(String::from_utf8_lossy(&buf).into_owned())
            }
            Err(LineError::Store(_e)) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(line, error = ?_e, "line read failed");
                #[cfg(feature = "defmt")]
                defmt::warn!("line {=u32} read failed", line);
                Some(String::from(READ_ERROR_PLACEHOLDER))
            }
            Err(_) => None,
        }
    }

    /// Iterate over all lines as text, trailing newlines included.
    ///
    /// Each call starts again from line 0. The line count is taken when the
    /// iterator is created.
    pub fn lines(&mut self) -> Lines<'_, S, N> {
        Lines::new(self)
    }

    /// Replace the bytes in `range` with `value`.
    ///
    /// `value` may be shorter or longer than the range; the rest of the store
    /// is moved accordingly. Both the line count and the cache window are
    /// updated to match the new contents.
    pub fn replace_range(
        &mut self,
        range: ByteRange,
        value: impl AsRef<[u8]>,
    ) -> Result<(), LineError<S::Error>> {
        let value = value.as_ref();
        let old_size = self.store.size();
        let ByteRange { start, end } = range;
        if start > end || end > old_size {
            return Err(LineError::InvalidRange);
        }
        let inserted_len = Size::try_from(value.len()).map_err(|_| LineError::InvalidRange)?;
        let removed_len = range.len();
        let new_size = old_size
            .saturating_sub(removed_len)
            .checked_add(inserted_len)
            .ok_or(LineError::InvalidRange)?;

        let removed = scan::count_newlines(&mut self.store, start, end)?;
        let added = to_offset(value.iter().filter(|&&b| b == b'\n').count());
        let old_open = self.ends_open()?;
        let new_open = if end < old_size {
            old_open
        } else if let Some(&last) = value.last() {
            last != b'\n'
        } else if let Some(before) = start.checked_sub(1) {
            scan::byte_at(&mut self.store, before)? != Some(b'\n')
        } else {
            true
        };

        {
            let progress = self
                .on_read_progress
                .as_mut()
                .map(|cb| &mut **cb as &mut dyn FnMut(Size, Size));
            if inserted_len > removed_len {
                let delta = inserted_len.saturating_sub(removed_len);
                shift::expand(&mut self.store, end, delta, progress)?;
            } else if inserted_len < removed_len {
                let delta = removed_len.saturating_sub(inserted_len);
                shift::shrink(&mut self.store, end, delta, progress)?;
            }
        }
        self.store.seek(start)?;
        write_all(&mut self.store, value)?;
        self.store.sync()?;

        self.line_count = self
            .line_count
            .saturating_add(added)
            .saturating_add(u32::from(new_open))
            .saturating_sub(removed.saturating_add(u32::from(old_open)))
            .max(1);

        self.reindex(&Edit {
            start,
            end,
            inserted: value,
            old_size,
            new_size,
            removed,
            added,
            old_open,
            new_open,
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(
            start,
            end,
            inserted = inserted_len,
            lines = self.line_count,
            "range replaced"
        );
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "range {=u32}..{=u32} replaced with {=u32} bytes, {=u32} lines",
            start,
            end,
            inserted_len,
            self.line_count
        );

        Ok(())
    }

    /// Insert an empty line before `line`, or at the end of the store when
    /// `line == line_count()`.
    pub fn insert_line(&mut self, line: u32) -> Result<(), LineError<S::Error>> {
        let at = if line == self.line_count {
            self.store.size()
        } else {
            self.line_range(line).ok_or(LineError::OutOfRange)?.start
        };
        self.replace_range(ByteRange::new(at, at), b"\n")
    }

    /// Remove `line` and its trailing newline.
    pub fn delete_line(&mut self, line: u32) -> Result<(), LineError<S::Error>> {
        let range = self.line_range(line).ok_or(LineError::OutOfRange)?;
        let end = range.end.min(self.store.size());
        self.replace_range(ByteRange::new(range.start, end), b"")
    }

    /// `true` when the store is empty or its last byte is not `\n`.
    fn ends_open(&mut self) -> Result<bool, S::Error> {
        match self.store.size().checked_sub(1) {
            None => Ok(true),
            Some(last) => Ok(scan::byte_at(&mut self.store, last)? != Some(b'\n')),
        }
    }

    /// Bring the window in line with the store after `edit`.
    fn reindex(&mut self, edit: &Edit<'_>) {
        if edit.new_size == 0 {
            self.newlines.clear();
            self.newlines.push_back(0);
            self.start_line = 0;
            self.start_offset = 0;
            return;
        }

        let moved = |offset: Offset| shift_offset(offset, edit.old_size, edit.new_size);

        if edit.end < self.start_offset {
            // Entirely before the window: only positions change.
            let mut shifted = NewlineRing::<N>::new();
            for nl in self.newlines.iter() {
                shifted.push_back(moved(nl));
            }
            self.newlines = shifted;
            self.start_offset = moved(self.start_offset);
            self.start_line = self
                .start_line
                .saturating_add(edit.added)
                .saturating_sub(edit.removed);
            return;
        }

        if edit.start < self.start_offset {
            // Straddles the window start; the line number of the new
            // start is unknown without a scan, so restart from the top.
            self.newlines.clear();
            self.start_line = 0;
            self.start_offset = 0;
            return;
        }

        let hits_eof = self.newlines.back() == Some(edit.old_size.saturating_sub(1));
        let marker = (hits_eof && edit.old_open).then(|| edit.old_size.saturating_sub(1));
        let is_marker = |nl: Offset| Some(nl) == marker;

        let mut rebuilt = NewlineRing::<N>::new();
        for nl in self.newlines.iter().filter(|&nl| nl < edit.start && !is_marker(nl)) {
            rebuilt.push_back(nl);
        }

        let covers = hits_eof || self.newlines.iter().any(|nl| nl >= edit.start);
        if covers {
            let mut complete = true;
            let inserted = edit
                .inserted
                .iter()
                .enumerate()
                .filter(|(_, &b)| b == b'\n')
                .map(|(i, _)| edit.start.saturating_add(to_offset(i)));
            let kept = self
                .newlines
                .iter()
                .filter(|&nl| nl >= edit.end && !is_marker(nl))
                .map(moved);
            for nl in inserted.chain(kept) {
                complete &= rebuilt.try_push_back(nl);
            }
            if hits_eof && complete && edit.new_open {
                let _ = rebuilt.try_push_back(edit.new_size.saturating_sub(1));
            }
        }

        self.newlines = rebuilt;
    }
}

fn window_moved(_from: u32, _to: u32) {
    #[cfg(feature = "tracing")]
    tracing::trace!(from = _from, to = _to, "line window moved");
    #[cfg(feature = "defmt")]
    defmt::trace!("line window moved {=u32} -> {=u32}", _from, _to);
}

/// Position of a byte at or after the edited range once the store has
/// changed from `old_size` to `new_size`.
fn shift_offset(offset: Offset, old_size: Size, new_size: Size) -> Offset {
    if new_size >= old_size {
        offset.saturating_add(new_size.saturating_sub(old_size))
    } else {
        offset.saturating_sub(old_size.saturating_sub(new_size))
    }
}

impl<S: Store + fmt::Debug, const N: usize> fmt::Debug for BufferWrapper<S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferWrapper")
            .field("store", &self.store)
            .field("line_count", &self.line_count)
            .field("start_line", &self.start_line)
            .field("start_offset", &self.start_offset)
            .field("newlines", &self.newlines)
            .field("on_read_progress", &self.on_read_progress.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;
    use platform::mocks::MemoryStore;

    fn wrap(text: &str) -> BufferWrapper<MemoryStore> {
        wrap_buffer(MemoryStore::from(text))
    }

    fn wrap_small(text: &str) -> BufferWrapper<MemoryStore, 2> {
        BufferWrapper::new(MemoryStore::from(text))
    }

    fn all_lines<const N: usize>(w: &mut BufferWrapper<MemoryStore, N>) -> Vec<String> {
        w.lines().collect()
    }

    #[test]
    fn two_lines_without_trailing_newline() {
        let mut w = wrap("abc\ndef");
        assert_eq!(w.line_count(), 2);
        assert_eq!(w.line_range(0), Some(ByteRange::new(0, 4)));
        assert_eq!(w.line_range(1), Some(ByteRange::new(4, 7)));
        assert_eq!(w.get_text(0, 0, 10).as_deref(), Some("abc\n"));
        assert_eq!(w.get_text(1, 0, 10).as_deref(), Some("def"));
        assert_eq!(w.line_range(2), None);
    }

    #[test]
    fn empty_store_has_one_line() {
        let mut w = wrap("");
        assert_eq!(w.line_count(), 1);
        assert_eq!(w.line_range(0), Some(ByteRange::new(0, 1)));
        assert_eq!(w.line_length(0), 1);
        assert_eq!(w.get_text(0, 0, 10).as_deref(), Some(""));
    }

    #[test]
    fn trailing_newline_does_not_add_a_line() {
        let mut w = wrap("a\nb\n");
        assert_eq!(w.line_count(), 2);
        assert_eq!(w.line_range(1), Some(ByteRange::new(2, 4)));
    }

    #[test]
    fn window_slides_forward_then_backward() {
        let mut w = wrap_small("abc\ndef\nghi\njkl\nmno");
        assert_eq!(w.line_count(), 5);
        assert_eq!(w.line_range(4), Some(ByteRange::new(16, 19)));
        assert_eq!(w.start_line(), w.line_count() - 2);
        assert_eq!(w.line_range(1), Some(ByteRange::new(4, 8)));
        assert_eq!(w.start_line(), 1);
        assert_eq!(w.line_range(0), Some(ByteRange::new(0, 4)));
        assert_eq!(w.start_line(), 0);
    }

    #[test]
    fn backward_scan_handles_empty_lines() {
        let mut w = wrap_small("a\n\n\nb\n");
        assert_eq!(w.line_range(3), Some(ByteRange::new(4, 6)));
        assert_eq!(w.line_range(1), Some(ByteRange::new(2, 3)));
        assert_eq!(w.line_range(2), Some(ByteRange::new(3, 4)));
        assert_eq!(w.line_range(0), Some(ByteRange::new(0, 2)));
    }

    #[test]
    fn requested_line_stays_cached() {
        let mut w = wrap_small("0\n1\n2\n3\n4\n5\n");
        for line in [5, 0, 3, 1, 4] {
            let first = w.line_range(line);
            assert!(w.offset_for_line(line).is_some());
            let start = w.start_line();
            assert_eq!(w.line_range(line), first);
            assert_eq!(w.start_line(), start);
        }
    }

    #[test]
    fn offset_for_line_rejects_lines_before_window() {
        let mut w = wrap_small("a\nb\nc\nd\n");
        w.line_range(3);
        assert_eq!(w.offset_for_line(0), None);
        assert_eq!(w.offset_for_line(3), Some(1));
        assert_eq!(w.offset_for_line(4), None);
    }

    #[test]
    fn get_text_clamps_to_line() {
        let mut w = wrap("hello\nworld\n");
        assert_eq!(w.get_text(0, 1, 3).as_deref(), Some("ell"));
        assert_eq!(w.get_text(0, 4, 100).as_deref(), Some("o\n"));
        assert_eq!(w.get_text(0, 6, 5).as_deref(), Some(""));
        assert_eq!(w.get_text(2, 0, 5), None);
    }

    #[test]
    fn get_text_into_reports_count() {
        let mut w = wrap("hello\nworld");
        let mut buf = [0u8; 3];
        assert_eq!(w.get_text_into(1, 2, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"rld");
        assert_eq!(w.get_text_into(9, 0, &mut buf), Err(LineError::OutOfRange));
    }

    #[test]
    fn get_text_read_error_yields_placeholder() {
        let mut w = wrap("abc\ndef\n");
        assert_eq!(w.line_range(1), Some(ByteRange::new(4, 8)));
        w.store.fail_reads(true);
        assert_eq!(w.get_text(1, 0, 4).as_deref(), Some(READ_ERROR_PLACEHOLDER));
        assert_eq!(w.get_text(7, 0, 4), None);
    }

    #[test]
    fn get_offset_within_line() {
        let mut w = wrap("ab\ncd\n");
        assert_eq!(w.get_offset(1, 1), Some(4));
        assert_eq!(w.get_offset(1, 2), Some(5));
        assert_eq!(w.get_offset(1, 3), Some(6));
        assert_eq!(w.get_offset(1, 4), None);
        assert_eq!(w.get_offset(2, 0), None);
    }

    #[test]
    fn failed_shift_is_recovered_by_set_buffer() {
        let mut w = wrap("abc\ndef\nghi\n");
        w.store.fail_writes(true);
        assert!(w.insert_line(0).unwrap_err().is_store());
        assert_eq!(w.line_count(), 3);

        w.store.fail_writes(false);
        let store = w.set_buffer(MemoryStore::default());
        let expected = crate::count_lines(MemoryStore::new(store.as_bytes().to_vec()));
        w.set_buffer(store);
        assert_eq!(w.line_count(), expected);
        let text = w.store().to_string_lossy();
        assert_eq!(all_lines(&mut w).concat(), text);
    }

    #[test]
    fn get_offset_reaches_end_of_unterminated_line() {
        let mut w = wrap("abc\ndef");
        assert_eq!(w.get_offset(1, 3), Some(7));
        assert_eq!(w.get_offset(1, 3), Some(w.size()));
        assert_eq!(w.get_offset(1, 4), None);
    }

    #[test]
    fn replace_same_length() {
        let mut w = wrap("abc\ndef");
        w.replace_range(ByteRange::new(0, 3), "xyz").unwrap();
        assert_eq!(w.store().as_bytes(), b"xyz\ndef");
        assert_eq!(w.size(), 7);
        assert_eq!(w.line_count(), 2);
    }

    #[test]
    fn replace_longer_keeps_following_line() {
        let mut w = wrap("abc\ndef");
        w.replace_range(ByteRange::new(0, 3), "wxyz").unwrap();
        assert_eq!(w.store().as_bytes(), b"wxyz\ndef");
        assert_eq!(w.size(), 8);
        assert_eq!(w.get_text(1, 0, 10).as_deref(), Some("def"));
        assert_eq!(w.line_range(1), Some(ByteRange::new(5, 8)));
    }

    #[test]
    fn replace_shorter_truncates() {
        let mut w = wrap("abcdef\nxyz\n");
        w.replace_range(ByteRange::new(1, 5), "-").unwrap();
        assert_eq!(w.store().as_bytes(), b"a-f\nxyz\n");
        assert_eq!(all_lines(&mut w), ["a-f\n", "xyz\n"]);
    }

    #[test]
    fn replace_adding_and_removing_newlines() {
        let mut w = wrap("one\ntwo\nthree\n");
        w.replace_range(ByteRange::new(3, 8), " 2\nand\n").unwrap();
        assert_eq!(w.store().to_string_lossy(), "one 2\nand\nthree\n");
        assert_eq!(w.line_count(), 3);
        assert_eq!(all_lines(&mut w), ["one 2\n", "and\n", "three\n"]);

        w.replace_range(ByteRange::new(0, 10), "x").unwrap();
        assert_eq!(w.line_count(), 1);
        assert_eq!(all_lines(&mut w), ["xthree\n"]);
    }

    #[test]
    fn replace_rejects_bad_ranges() {
        let mut w = wrap("abc");
        assert_eq!(
            w.replace_range(ByteRange::new(2, 1), ""),
            Err(LineError::InvalidRange)
        );
        assert_eq!(
            w.replace_range(ByteRange::new(0, 4), ""),
            Err(LineError::InvalidRange)
        );
        assert_eq!(w.store().as_bytes(), b"abc");
    }

    #[test]
    fn replace_propagates_write_failure() {
        let mut store = MemoryStore::from("abc\n");
        store.fail_writes(true);
        let mut w = wrap_buffer(store);
        let err = w.replace_range(ByteRange::new(0, 1), "z").unwrap_err();
        assert!(err.is_store());
    }

    #[test]
    fn insert_line_at_start() {
        let mut w = wrap("abc\ndef\nghi\n");
        w.insert_line(0).unwrap();
        assert_eq!(w.line_count(), 4);
        assert_eq!(w.size(), 13);
        assert_eq!(w.get_text(0, 0, 10).as_deref(), Some("\n"));
        assert_eq!(w.get_text(1, 0, 10).as_deref(), Some("abc\n"));
    }

    #[test]
    fn insert_line_at_end() {
        let mut w = wrap("abc\n");
        w.insert_line(1).unwrap();
        assert_eq!(w.store().as_bytes(), b"abc\n\n");
        assert_eq!(w.line_count(), 2);
        assert_eq!(w.insert_line(5), Err(LineError::OutOfRange));
    }

    #[test]
    fn delete_middle_line() {
        let mut w = wrap("abc\ndef\nghi");
        w.delete_line(1).unwrap();
        assert_eq!(w.line_count(), 2);
        assert_eq!(w.size(), 7);
        assert_eq!(w.get_text(1, 0, 10).as_deref(), Some("ghi"));
    }

    #[test]
    fn delete_last_unterminated_line() {
        let mut w = wrap("a\nb");
        w.delete_line(1).unwrap();
        assert_eq!(w.store().as_bytes(), b"a\n");
        assert_eq!(w.line_count(), 1);
        assert_eq!(w.line_range(0), Some(ByteRange::new(0, 2)));
    }

    #[test]
    fn delete_only_line_leaves_empty_store() {
        let mut w = wrap("abc\n");
        w.delete_line(0).unwrap();
        assert_eq!(w.size(), 0);
        assert_eq!(w.line_count(), 1);
        assert_eq!(w.line_range(0), Some(ByteRange::new(0, 1)));
        w.delete_line(0).unwrap();
        assert_eq!(w.line_count(), 1);
    }

    #[test]
    fn insert_into_empty_store() {
        let mut w = wrap("");
        w.insert_line(0).unwrap();
        assert_eq!(w.store().as_bytes(), b"\n");
        assert_eq!(w.line_count(), 1);
        w.replace_range(ByteRange::new(1, 1), "xy").unwrap();
        assert_eq!(w.line_count(), 2);
        assert_eq!(all_lines(&mut w), ["\n", "xy"]);
    }

    #[test]
    fn edit_before_window_shifts_it() {
        let mut w = wrap_small("a\nb\nc\nd\ne\n");
        assert_eq!(w.line_range(4), Some(ByteRange::new(8, 10)));
        let start = w.start_line();
        w.replace_range(ByteRange::new(0, 0), "new\nlines\n").unwrap();
        assert_eq!(w.start_line(), start + 2);
        assert_eq!(w.line_count(), 7);
        assert_eq!(w.get_text(6, 0, 5).as_deref(), Some("e\n"));
        assert_eq!(w.get_text(0, 0, 5).as_deref(), Some("new\n"));
    }

    #[test]
    fn edit_straddling_window_start_rescans() {
        let mut w = wrap_small("a\nb\nc\nd\ne\n");
        w.line_range(4);
        w.replace_range(ByteRange::new(5, 6), "").unwrap();
        assert_eq!(w.store().as_bytes(), b"a\nb\ncd\ne\n");
        assert_eq!(all_lines(&mut w), ["a\n", "b\n", "cd\n", "e\n"]);
    }

    #[test]
    fn edit_beyond_full_window_is_rescanned_lazily() {
        let mut w = wrap_small("a\nb\nc\nd\n");
        w.replace_range(ByteRange::new(1, 1), "\n\n\n").unwrap();
        assert_eq!(w.line_count(), 7);
        assert_eq!(
            all_lines(&mut w),
            ["a\n", "\n", "\n", "\n", "b\n", "c\n", "d\n"]
        );
    }

    #[test]
    fn lines_restart_from_zero() {
        let mut w = wrap("x\ny\nz");
        assert_eq!(all_lines(&mut w), ["x\n", "y\n", "z"]);
        let mut partial = w.lines();
        assert_eq!(partial.next().as_deref(), Some("x\n"));
        assert_eq!(all_lines(&mut w), ["x\n", "y\n", "z"]);
    }

    #[test]
    fn progress_reported_during_scan_and_edit() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let text = "line\n".repeat(250);
        let mut w = BufferWrapper::<MemoryStore>::with_progress(
            MemoryStore::from(text.as_str()),
            move |done, total| sink.borrow_mut().push((done, total)),
        );
        assert_eq!(w.line_count(), 250);
        assert_eq!(*calls.borrow(), vec![(499, 1250), (999, 1250)]);

        calls.borrow_mut().clear();
        w.insert_line(0).unwrap();
        let last = *calls.borrow().last().unwrap();
        assert_eq!(last, (1250, 1250));
    }

    #[test]
    fn set_buffer_reindexes() {
        let mut w = wrap("a\nb\n");
        let old = w.set_buffer(MemoryStore::from("x\ny\nz\n"));
        assert_eq!(old.as_bytes(), b"a\nb\n");
        assert_eq!(w.line_count(), 3);
        assert_eq!(w.into_inner().as_bytes(), b"x\ny\nz\n");
    }

    #[test]
    fn borrowed_store_sees_edits() {
        let mut store = MemoryStore::from("a\n");
        {
            let mut w = wrap_buffer(&mut store);
            w.insert_line(1).unwrap();
        }
        assert_eq!(store.as_bytes(), b"a\n\n");
        assert_eq!(store.sync_count(), 1);
    }
}
