//! In-place tail moves used by range replacement.
//!
//! `expand` opens a gap by copying the tail toward the end, back to front;
//! `shrink` closes one by copying it toward the start, front to back, then
//! truncating. Both go through a single [`SCAN_CHUNK_SIZE`] buffer, and the
//! copy order guarantees a chunk is never overwritten before it is read.

use platform::{read_up_to, write_all, Offset, Size, Store};

use crate::config::{SCAN_CHUNK_SIZE, SHIFT_PROGRESS_STEPS};
use crate::scan::{to_offset, to_usize};

/// Progress sink: `(bytes_moved, bytes_total)`.
pub type Progress<'a> = Option<&'a mut dyn FnMut(Size, Size)>;

/// Move `[src, size)` to `[src + delta, size + delta)`.
///
/// The bytes in `[src, src + delta)` are left as they were; the caller
/// overwrites them.
pub fn expand<S: Store + ?Sized>(
    store: &mut S,
    src: Offset,
    delta: Size,
    mut progress: Progress<'_>,
) -> Result<(), S::Error> {
    let size = store.size();
    let total = size.saturating_sub(src);
    let step = report_step(total);
    let mut remaining = total;
    let mut next_report = total.saturating_sub(step);
    let mut end = size;
    let mut buf = [0u8; SCAN_CHUNK_SIZE];

    while remaining > 0 {
        let n = remaining.min(to_offset(SCAN_CHUNK_SIZE));
        end = end.saturating_sub(n);

        store.seek(end)?;
        let chunk = buf.get_mut(..to_usize(n)).unwrap_or(&mut []);
        let read = read_up_to(store, chunk)?;
        store.seek(end.saturating_add(delta))?;
        write_all(store, chunk.get(..read).unwrap_or(&[]))?;

        remaining = remaining.saturating_sub(n);
        if remaining <= next_report {
            report(&mut progress, total.saturating_sub(remaining), total);
            next_report = remaining.saturating_sub(step);
        }
    }

    Ok(())
}

/// Move `[src, size)` to `[src - delta, size - delta)` and truncate the
/// store to `size - delta`.
pub fn shrink<S: Store + ?Sized>(
    store: &mut S,
    src: Offset,
    delta: Size,
    mut progress: Progress<'_>,
) -> Result<(), S::Error> {
    let size = store.size();
    let total = size.saturating_sub(src);
    let step = report_step(total);
    let mut next_report = step;
    let mut offset = src;
    let mut buf = [0u8; SCAN_CHUNK_SIZE];

    while offset < size {
        store.seek(offset)?;
        let n = read_up_to(store, &mut buf)?;
        if n == 0 {
            break;
        }
        store.seek(offset.saturating_sub(delta))?;
        write_all(store, buf.get(..n).unwrap_or(&[]))?;
        offset = offset.saturating_add(to_offset(n));

        let moved = offset.saturating_sub(src);
        if moved >= next_report {
            report(&mut progress, moved, total);
            next_report = moved.saturating_add(step);
        }
    }

    store.seek(size.saturating_sub(delta))?;
    store.truncate()?;
    Ok(())
}

fn report_step(total: Size) -> Size {
    (total / SHIFT_PROGRESS_STEPS).max(1)
}

fn report(progress: &mut Progress<'_>, done: Size, total: Size) {
    if let Some(cb) = progress.as_mut() {
        cb(done, total);
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
    use platform::mocks::MemoryStore;

    #[test]
    fn expand_moves_tail_right() {
        let mut f = MemoryStore::from("abcdef");
        expand(&mut f, 2, 3, None).unwrap();
        assert_eq!(&f.as_bytes()[5..], b"cdef");
        assert_eq!(f.size(), 9);
        assert_eq!(&f.as_bytes()[..2], b"ab");
    }

    #[test]
    fn expand_at_end_is_noop() {
        let mut f = MemoryStore::from("abc");
        expand(&mut f, 3, 4, None).unwrap();
        assert_eq!(f.as_bytes(), b"abc");
    }

    #[test]
    fn expand_overlapping_multi_chunk() {
        let text: Vec<u8> = (0..SCAN_CHUNK_SIZE * 3).map(|i| (i % 251) as u8).collect();
        let mut f = MemoryStore::new(text.clone());
        expand(&mut f, 10, 7, None).unwrap();
        assert_eq!(&f.as_bytes()[17..], &text[10..]);
        assert_eq!(&f.as_bytes()[..10], &text[..10]);
    }

    #[test]
    fn shrink_moves_tail_left_and_truncates() {
        let mut f = MemoryStore::from("abcdef");
        shrink(&mut f, 4, 2, None).unwrap();
        assert_eq!(f.as_bytes(), b"abef");
    }

    #[test]
    fn shrink_to_empty() {
        let mut f = MemoryStore::from("abc");
        shrink(&mut f, 3, 3, None).unwrap();
        assert_eq!(f.as_bytes(), b"");
    }

    #[test]
    fn shrink_overlapping_multi_chunk() {
        let text: Vec<u8> = (0..SCAN_CHUNK_SIZE * 3 + 5).map(|i| (i % 241) as u8).collect();
        let mut f = MemoryStore::new(text.clone());
        shrink(&mut f, 20, 13, None).unwrap();
        let mut expected = text[..7].to_vec();
        expected.extend_from_slice(&text[20..]);
        assert_eq!(f.as_bytes(), expected.as_slice());
    }

    #[test]
    fn shifts_report_progress_to_completion() {
        let text = vec![b'q'; SCAN_CHUNK_SIZE * 4];
        let mut f = MemoryStore::new(text);
        let mut calls = Vec::new();
        let mut cb = |done: Size, total: Size| calls.push((done, total));
        expand(&mut f, 0, 1, Some(&mut cb)).unwrap();
        let total = to_offset(SCAN_CHUNK_SIZE * 4);
        assert!(!calls.is_empty());
        assert_eq!(*calls.last().unwrap(), (total, total));
        assert!(calls.windows(2).all(|w| w[0].0 <= w[1].0));

        calls.clear();
        let mut cb = |done: Size, total: Size| calls.push((done, total));
        shrink(&mut f, 1, 1, Some(&mut cb)).unwrap();
        assert_eq!(*calls.last().unwrap(), (total, total));
    }
}
