//! Chunked newline scans over a [`Store`].
//!
//! Every scan reads through one [`SCAN_CHUNK_SIZE`] stack buffer, so the
//! memory cost is fixed no matter how long a line or how large the file is.
//!
//! The cache-miss scans (`next_newline`, `previous_newline`) absorb store
//! errors and report "not found": a failed scan only means the requested line
//! could not be cached. The helpers used by edits (`count_newlines`,
//! `byte_at`, `for_each_newline`) propagate errors instead.

use platform::{read_up_to, Offset, Store};

use crate::config::SCAN_CHUNK_SIZE;

/// Offset of the first `\n` at or after `offset`.
///
/// If the scan reaches EOF without finding one, `size - 1` is returned: the
/// last byte of a non-empty store always terminates the final line.
///
/// Returns `None` when `offset >= size` or when the store fails.
pub fn next_newline<S: Store + ?Sized>(store: &mut S, offset: Offset) -> Option<Offset> {
    let size = store.size();
    if offset >= size {
        return None;
    }

    if let Err(_e) = store.seek(offset) {
        scan_aborted(offset, &_e);
        return None;
    }

    let mut buf = [0u8; SCAN_CHUNK_SIZE];
    let mut chunk_start = offset;
    loop {
        let n = match read_up_to(store, &mut buf) {
            Ok(n) => n,
            Err(_e) => {
                scan_aborted(chunk_start, &_e);
                return None;
            }
        };
        let chunk = buf.get(..n).unwrap_or(&[]);
        if let Some(i) = chunk.iter().position(|&b| b == b'\n') {
            return Some(chunk_start.saturating_add(to_offset(i)));
        }
        chunk_start = chunk_start.saturating_add(to_offset(n));
        if n < SCAN_CHUNK_SIZE {
            break;
        }
    }

    // Treat the end of the store as the final "newline".
    size.checked_sub(1)
}

/// Offset of the last `\n` at or before `offset`.
///
/// Scans backward chunk by chunk, each chunk in reverse byte order. Returns
/// `None` if no newline exists between the start of the store and `offset`,
/// or when the store fails.
pub fn previous_newline<S: Store + ?Sized>(store: &mut S, offset: Offset) -> Option<Offset> {
    let mut end = offset.saturating_add(1).min(store.size());
    let mut buf = [0u8; SCAN_CHUNK_SIZE];

    while end > 0 {
        let start = end.saturating_sub(to_offset(SCAN_CHUNK_SIZE));
        let len = to_usize(end.saturating_sub(start));

        if let Err(_e) = store.seek(start) {
            scan_aborted(start, &_e);
            return None;
        }
        let chunk = buf.get_mut(..len).unwrap_or(&mut []);
        let n = match read_up_to(store, chunk) {
            Ok(n) => n,
            Err(_e) => {
                scan_aborted(start, &_e);
                return None;
            }
        };
        let chunk = chunk.get(..n).unwrap_or(&[]);
        if let Some(i) = chunk.iter().rposition(|&b| b == b'\n') {
            return Some(start.saturating_add(to_offset(i)));
        }
        end = start;
    }

    None
}

/// Number of `\n` bytes in `[start, end)`.
pub fn count_newlines<S: Store + ?Sized>(
    store: &mut S,
    start: Offset,
    end: Offset,
) -> Result<u32, S::Error> {
    let mut buf = [0u8; SCAN_CHUNK_SIZE];
    let mut pos = start;
    let mut count = 0u32;

    while pos < end {
        let want = to_usize(end.saturating_sub(pos)).min(SCAN_CHUNK_SIZE);
        store.seek(pos)?;
        let chunk = buf.get_mut(..want).unwrap_or(&mut []);
        let n = read_up_to(store, chunk)?;
        if n == 0 {
            break;
        }
        let found = chunk.get(..n).unwrap_or(&[]).iter().filter(|&&b| b == b'\n').count();
        count = count.saturating_add(u32::try_from(found).unwrap_or(u32::MAX));
        pos = pos.saturating_add(to_offset(n));
    }

    Ok(count)
}

/// Byte at `offset`, or `None` past the end of the store.
pub fn byte_at<S: Store + ?Sized>(store: &mut S, offset: Offset) -> Result<Option<u8>, S::Error> {
    if offset >= store.size() {
        return Ok(None);
    }
    store.seek(offset)?;
    let mut byte = [0u8; 1];
    let n = read_up_to(store, &mut byte)?;
    Ok((n == 1).then_some(byte[0]))
}

/// Call `f` with the offset of every `\n` in the store, in order.
///
/// One sequential pass; used to build the index when a store is attached.
pub fn for_each_newline<S, F>(store: &mut S, mut f: F) -> Result<(), S::Error>
where
    S: Store + ?Sized,
    F: FnMut(Offset),
{
    store.seek(0)?;
    let mut buf = [0u8; SCAN_CHUNK_SIZE];
    let mut chunk_start: Offset = 0;

    loop {
        let n = read_up_to(store, &mut buf)?;
        let chunk = buf.get(..n).unwrap_or(&[]);
        for (i, _) in chunk.iter().enumerate().filter(|(_, &b)| b == b'\n') {
            f(chunk_start.saturating_add(to_offset(i)));
        }
        chunk_start = chunk_start.saturating_add(to_offset(n));
        if n < SCAN_CHUNK_SIZE {
            return Ok(());
        }
    }
}

/// Chunk indices and lengths are bounded by `SCAN_CHUNK_SIZE`, far below
/// `u32::MAX`; the saturation never triggers in practice.
pub(crate) fn to_offset(n: usize) -> Offset {
    Offset::try_from(n).unwrap_or(Offset::MAX)
}

/// Offset is u32; usize is at least 32 bits on every supported target.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn to_usize(n: Offset) -> usize {
    n as usize
}

fn scan_aborted<E: core::fmt::Debug>(_offset: Offset, _error: &E) {
    #[cfg(feature = "tracing")]
    tracing::warn!(offset = _offset, error = ?_error, "newline scan aborted");
    #[cfg(feature = "defmt")]
    defmt::warn!("newline scan aborted at {=u32}", _offset);
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
    fn next_newline_finds_first() {
        let mut f = MemoryStore::from("abc\ndef\n");
        assert_eq!(next_newline(&mut f, 0), Some(3));
        assert_eq!(next_newline(&mut f, 3), Some(3));
        assert_eq!(next_newline(&mut f, 4), Some(7));
    }

    #[test]
    fn next_newline_treats_eof_as_newline() {
        let mut f = MemoryStore::from("abc\ndef");
        assert_eq!(next_newline(&mut f, 4), Some(6));
    }

    #[test]
    fn next_newline_past_end_is_none() {
        let mut f = MemoryStore::from("abc\n");
        assert_eq!(next_newline(&mut f, 4), None);
        assert_eq!(next_newline(&mut MemoryStore::from(""), 0), None);
    }

    #[test]
    fn next_newline_crosses_chunks() {
        let mut text = "x".repeat(SCAN_CHUNK_SIZE * 2 + 17);
        text.push('\n');
        let mut f = MemoryStore::from(text.as_str());
        assert_eq!(next_newline(&mut f, 5), Some(to_offset(SCAN_CHUNK_SIZE * 2 + 17)));
    }

    #[test]
    fn next_newline_exact_chunk_without_newline() {
        let text = "y".repeat(SCAN_CHUNK_SIZE);
        let mut f = MemoryStore::from(text.as_str());
        assert_eq!(next_newline(&mut f, 0), Some(to_offset(SCAN_CHUNK_SIZE - 1)));
    }

    #[test]
    fn next_newline_absorbs_read_error() {
        let mut f = MemoryStore::from("abc\n");
        f.fail_reads(true);
        assert_eq!(next_newline(&mut f, 0), None);
    }

    #[test]
    fn previous_newline_is_inclusive() {
        let mut f = MemoryStore::from("a\n\nb");
        assert_eq!(previous_newline(&mut f, 2), Some(2));
        assert_eq!(previous_newline(&mut f, 1), Some(1));
        assert_eq!(previous_newline(&mut f, 0), None);
    }

    #[test]
    fn previous_newline_crosses_chunks() {
        let mut text = String::from("ab\n");
        text.push_str(&"z".repeat(SCAN_CHUNK_SIZE * 3));
        let mut f = MemoryStore::from(text.as_str());
        let last = f.as_bytes().len() as Offset - 1;
        assert_eq!(previous_newline(&mut f, last), Some(2));
    }

    #[test]
    fn previous_newline_none_at_start() {
        let mut f = MemoryStore::from("abcdef");
        assert_eq!(previous_newline(&mut f, 5), None);
    }

    #[test]
    fn previous_newline_absorbs_read_error() {
        let mut f = MemoryStore::from("a\nb");
        f.fail_reads(true);
        assert_eq!(previous_newline(&mut f, 2), None);
    }

    #[test]
    fn count_newlines_in_range() {
        let mut f = MemoryStore::from("a\nb\nc\n");
        assert_eq!(count_newlines(&mut f, 0, 6).unwrap(), 3);
        assert_eq!(count_newlines(&mut f, 2, 3).unwrap(), 0);
        assert_eq!(count_newlines(&mut f, 3, 3).unwrap(), 0);
    }

    #[test]
    fn count_newlines_propagates_errors() {
        let mut f = MemoryStore::from("a\nb");
        f.fail_reads(true);
        assert!(count_newlines(&mut f, 0, 3).is_err());
    }

    #[test]
    fn byte_at_reads_single_byte() {
        let mut f = MemoryStore::from("xyz");
        assert_eq!(byte_at(&mut f, 1).unwrap(), Some(b'y'));
        assert_eq!(byte_at(&mut f, 3).unwrap(), None);
    }

    #[test]
    fn for_each_newline_visits_all() {
        let mut text = "a\n".repeat(SCAN_CHUNK_SIZE);
        text.push('b');
        let mut f = MemoryStore::from(text.as_str());
        let mut seen = Vec::new();
        for_each_newline(&mut f, |o| seen.push(o)).unwrap();
        assert_eq!(seen.len(), SCAN_CHUNK_SIZE);
        assert_eq!(seen[0], 1);
        assert_eq!(*seen.last().unwrap(), to_offset(SCAN_CHUNK_SIZE * 2 - 1));
    }
}
