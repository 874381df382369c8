//! Line-indexed access to large byte stores.
//!
//! Text files on the SD card (playlists, settings, logs, user notes) are far
//! bigger than the RAM available to the UI task. This crate gives line-level
//! read and edit access to any [`platform::Store`] while keeping only a small
//! fixed window of newline offsets in memory.
//!
//! # Modules
//!
//! - [`wrapper`]: `BufferWrapper<S, N>`: line ranges, text reads, edits
//! - [`newline_ring`]: `NewlineRing<N>` fixed-capacity offset window
//! - [`scan`]: chunked forward/backward newline scans
//! - [`shift`]: in-place tail moves for growing/shrinking edits
//! - [`line_reader`]: `Lines` iterator, rewindable `LineReader`, `count_lines`
//! - [`split`]: `split_string` and `trim`
//! - [`settings`]: `name=value` settings files
//! - `file_wrapper` (`std`): `FileWrapper` over a host file
//!
//! # Features
//!
//! - `std`: host file support (`FileWrapper`) and `std::error::Error` impls
//! - `defmt`: `defmt::Format` derives and defmt log output (hardware builds)
//! - `tracing`: tracing log output (emulator and host tools)

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;
#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod config;
pub mod error;
#[cfg(feature = "std")]
pub mod file_wrapper;
pub mod line_reader;
pub mod newline_ring;
pub mod scan;
pub mod settings;
pub mod shift;
pub mod split;
pub mod wrapper;

pub use config::{DEFAULT_CACHE_SIZE, SCAN_CHUNK_SIZE};
pub use error::LineError;
#[cfg(feature = "std")]
pub use file_wrapper::FileWrapper;
pub use line_reader::{count_lines, LineReader, Lines};
pub use newline_ring::NewlineRing;
pub use settings::{load_settings, save_settings, BoundSetting, Setting};
pub use split::{split_string, trim};
pub use wrapper::{wrap_buffer, BufferWrapper, ByteRange, ProgressFn};
