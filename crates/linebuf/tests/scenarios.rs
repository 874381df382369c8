//! Line index behaviour on small fixed stores.
//!
//! Every test wraps a `MemoryStore`, performs reads or edits through the
//! public API only, and checks both the returned values and the bytes left in
//! the store.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]

use linebuf::{split_string, wrap_buffer, BufferWrapper, ByteRange, LineError};
use platform::mocks::MemoryStore;
use platform::Store;

fn lines_of<S: Store, const N: usize>(w: &mut BufferWrapper<S, N>) -> Vec<String> {
    w.lines().collect()
}

#[test]
fn two_line_store() {
    let mut store = MemoryStore::from("abc\ndef");
    let mut w = wrap_buffer(&mut store);
    assert_eq!(w.line_count(), 2);
    assert_eq!(w.line_range(0), Some(ByteRange::new(0, 4)));
    assert_eq!(w.line_range(1), Some(ByteRange::new(4, 7)));
    assert_eq!(w.get_text(0, 0, 10).as_deref(), Some("abc\n"));
    assert_eq!(w.get_text(1, 0, 10).as_deref(), Some("def"));
}

#[test]
fn empty_store() {
    let mut w = wrap_buffer(MemoryStore::from(""));
    assert_eq!(w.line_count(), 1);
    assert_eq!(w.line_range(0), Some(ByteRange::new(0, 1)));
    assert_eq!(w.line_length(0), 1);
}

#[test]
fn small_cache_slides_both_ways() {
    let mut w: BufferWrapper<MemoryStore, 2> =
        BufferWrapper::new(MemoryStore::from("abc\ndef\nghi\njkl\nmno"));
    let last = w.line_count() - 1;
    assert_eq!(w.get_text(last, 0, 10).as_deref(), Some("mno"));
    assert_eq!(w.start_line(), w.line_count() - 2);
    assert_eq!(w.get_text(1, 0, 10).as_deref(), Some("def\n"));
    assert_eq!(w.start_line(), 1);
}

#[test]
fn replace_in_place() {
    let mut w = wrap_buffer(MemoryStore::from("abc\ndef"));
    w.replace_range(ByteRange::new(0, 3), "xyz").unwrap();
    assert_eq!(w.store().as_bytes(), b"xyz\ndef");
    assert_eq!(w.size(), 7);
}

#[test]
fn replace_growing() {
    let mut w = wrap_buffer(MemoryStore::from("abc\ndef"));
    w.replace_range(ByteRange::new(0, 3), "wxyz").unwrap();
    assert_eq!(w.store().as_bytes(), b"wxyz\ndef");
    assert_eq!(w.size(), 8);
    assert_eq!(w.get_text(1, 0, 10).as_deref(), Some("def"));
}

#[test]
fn insert_first_line() {
    let mut w = wrap_buffer(MemoryStore::from("abc\ndef\nghi\n"));
    let (count, size) = (w.line_count(), w.size());
    w.insert_line(0).unwrap();
    assert_eq!(w.line_count(), count + 1);
    assert_eq!(w.size(), size + 1);
    assert_eq!(w.get_text(0, 0, 10).as_deref(), Some("\n"));
    assert_eq!(w.get_text(1, 0, 10).as_deref(), Some("abc\n"));
}

#[test]
fn delete_middle_line() {
    let mut w = wrap_buffer(MemoryStore::from("abc\ndef\nghi"));
    let (count, size) = (w.line_count(), w.size());
    w.delete_line(1).unwrap();
    assert_eq!(w.line_count(), count - 1);
    assert_eq!(w.size(), size - 4);
    assert_eq!(w.get_text(1, 0, 10).as_deref(), Some("ghi"));
}

#[test]
fn split_keeps_empty_fields() {
    let fields = split_string(",,,,", ',');
    assert_eq!(fields.len(), 5);
    assert!(fields.iter().all(|f| f.is_empty()));
}

#[test]
fn out_of_range_lines_are_reported() {
    let mut w = wrap_buffer(MemoryStore::from("one\ntwo\n"));
    assert_eq!(w.line_range(2), None);
    assert_eq!(w.line_length(2), 0);
    assert_eq!(w.get_text(2, 0, 1), None);
    assert_eq!(w.delete_line(2), Err(LineError::OutOfRange));
    assert_eq!(w.insert_line(3), Err(LineError::OutOfRange));
    assert_eq!(w.store().as_bytes(), b"one\ntwo\n");
}

#[test]
fn edits_far_from_cached_window() {
    let text: String = (0..200).map(|i| format!("line {i}\n")).collect();
    let mut w: BufferWrapper<MemoryStore, 8> = BufferWrapper::new(MemoryStore::from(text.as_str()));
    assert_eq!(w.get_text(150, 0, 20).as_deref(), Some("line 150\n"));

    // Edit near the top while the window sits around line 150.
    w.insert_line(3).unwrap();
    w.delete_line(0).unwrap();
    assert_eq!(w.line_count(), 200);
    assert_eq!(w.get_text(150, 0, 20).as_deref(), Some("line 150\n"));
    assert_eq!(w.get_text(2, 0, 20).as_deref(), Some("\n"));
    assert_eq!(w.get_text(0, 0, 20).as_deref(), Some("line 1\n"));

    // Edit inside the window.
    let range = w.line_range(151).unwrap();
    w.replace_range(range, "replaced\nand split\n").unwrap();
    assert_eq!(w.line_count(), 201);
    assert_eq!(w.get_text(151, 0, 20).as_deref(), Some("replaced\n"));
    assert_eq!(w.get_text(152, 0, 20).as_deref(), Some("and split\n"));
    assert_eq!(w.get_text(153, 0, 20).as_deref(), Some("line 152\n"));

    let expected: Vec<String> = w.store().to_string_lossy().split_inclusive('\n').map(String::from).collect();
    assert_eq!(lines_of(&mut w), expected);
}

#[test]
fn appending_to_unterminated_store() {
    let mut w = wrap_buffer(MemoryStore::from("abc"));
    let end = w.size();
    w.replace_range(ByteRange::new(end, end), "\ndef").unwrap();
    assert_eq!(w.line_count(), 2);
    assert_eq!(lines_of(&mut w), ["abc\n", "def"]);

    // Terminating the last line does not add one.
    w.insert_line(2).unwrap();
    assert_eq!(w.line_count(), 2);
    assert_eq!(w.store().as_bytes(), b"abc\ndef\n");
}

#[test]
fn delete_everything_line_by_line() {
    let mut w: BufferWrapper<MemoryStore, 2> = BufferWrapper::new(MemoryStore::from("a\nb\nc\nd"));
    while w.size() > 0 {
        w.delete_line(0).unwrap();
    }
    assert_eq!(w.line_count(), 1);
    assert_eq!(w.line_range(0), Some(ByteRange::new(0, 1)));
    assert_eq!(lines_of(&mut w), [""]);
}
