//! End-to-end tests: FileWrapper → LocalFile → disk.
//!
//! No mocks. Uses tempfiles, the way the editor runs against the SD card in
//! the emulator.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use linebuf::{load_settings, save_settings, BoundSetting, ByteRange, FileWrapper, LineReader, Setting};
use platform::storage_local::LocalFile;
use tempfile::TempDir;

#[test]
fn open_missing_file_fails_without_create() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("missing.txt");
    assert!(FileWrapper::open(&path, false, None).is_err());
    assert!(!path.exists());
}

#[test]
fn open_with_create_starts_empty() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("new.txt");
    let mut w = FileWrapper::open(&path, true, None).expect("create");
    assert_eq!(w.size(), 0);
    assert_eq!(w.line_count(), 1);
    assert_eq!(w.line_range(0), Some(ByteRange::new(0, 1)));
    assert!(path.exists());
}

#[test]
fn edits_reach_the_disk() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("notes.txt");
    fs::write(&path, "first\nsecond\nthird").expect("write");

    let mut w = FileWrapper::open(&path, false, None).expect("open");
    assert_eq!(w.line_count(), 3);
    w.delete_line(1).expect("delete");
    w.insert_line(0).expect("insert");
    let range = w.line_range(2).expect("line 2");
    w.replace_range(range, "3rd, longer than before").expect("replace");
    drop(w);

    assert_eq!(fs::read_to_string(&path).expect("read"), "\nfirst\n3rd, longer than before");
}

#[test]
fn large_file_with_progress() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("big.txt");
    let text: String = (0..5_000).map(|i| format!("{i:05}\n")).collect();
    fs::write(&path, &text).expect("write");

    let reports = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&reports);
    let mut w = FileWrapper::open(&path, false, Some(Box::new(move |_: u32, _: u32| *sink.borrow_mut() += 1)))
        .expect("open");
    assert_eq!(w.line_count(), 5_000);
    assert_eq!(*reports.borrow(), 50);

    assert_eq!(w.get_text(4_321, 0, 16).as_deref(), Some("04321\n"));
    assert_eq!(w.get_text(7, 0, 16).as_deref(), Some("00007\n"));
    assert_eq!(w.get_offset(4_999, 0), Some(4_999 * 6));

    w.insert_line(10).expect("insert");
    assert_eq!(w.get_text(4_322, 0, 16).as_deref(), Some("04321\n"));
    assert_eq!(platform::Store::size(w.file()) as usize, text.len() + 1);
    assert_eq!(fs::metadata(&path).expect("metadata").len(), text.len() as u64 + 1);
}

#[test]
fn assume_file_keeps_index() {
    let dir = TempDir::new().expect("tempdir");
    let original = dir.path().join("orig.txt");
    let copy = dir.path().join("copy.txt");
    fs::write(&original, "a\nb\nc\n").expect("write");

    let mut w = FileWrapper::open(&original, false, None).expect("open");
    w.line_range(2).expect("line 2");
    fs::copy(&original, &copy).expect("copy");

    let previous = w.assume_file(&copy).expect("assume");
    drop(previous);
    w.delete_line(0).expect("delete");
    drop(w);

    assert_eq!(fs::read_to_string(&copy).expect("read copy"), "b\nc\n");
    assert_eq!(fs::read_to_string(&original).expect("read original"), "a\nb\nc\n");

    let mut w = FileWrapper::open(&original, false, None).expect("reopen");
    assert!(w.assume_file(dir.path().join("nope.txt")).is_err());
    assert_eq!(w.get_text(0, 0, 4).as_deref(), Some("a\n"));
}

#[test]
fn line_reader_over_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("list.m3u");
    fs::write(&path, "#EXTM3U\r\ntrack1.flac\r\ntrack2.flac\r\n").expect("write");

    let mut reader: LineReader<LocalFile> = LineReader::new(LocalFile::open(&path).expect("open"));
    let entries: Vec<String> = (&mut reader)
        .map(|l| l.trim_end().to_owned())
        .filter(|l| !l.starts_with('#'))
        .collect();
    assert_eq!(entries, ["track1.flac", "track2.flac"]);
}

#[test]
fn settings_round_trip_on_disk() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("app.ini");

    let mut volume = 42u32;
    let mut name = String::from("living room");
    {
        let bindings = [
            BoundSetting::new("volume", Setting::U32(&mut volume)),
            BoundSetting::new("name", Setting::Str(&mut name)),
        ];
        let mut file = LocalFile::create(&path).expect("create");
        save_settings(&mut file, &bindings).expect("save");
    }
    assert_eq!(
        fs::read_to_string(&path).expect("read"),
        "volume=42\r\nname=living room\r\n"
    );

    let mut volume = 0u32;
    let mut name = String::new();
    let mut bindings = [
        BoundSetting::new("volume", Setting::U32(&mut volume)),
        BoundSetting::new("name", Setting::Str(&mut name)),
    ];
    let mut file = LocalFile::open(&path).expect("open");
    assert_eq!(load_settings(&mut file, &mut bindings), 2);
    drop(bindings);
    assert_eq!(volume, 42);
    assert_eq!(name, "living room");
}
