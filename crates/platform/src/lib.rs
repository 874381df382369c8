//! Storage abstraction layer for the handheld firmware.
//!
//! This crate defines the byte-store contract that every file-like medium
//! implements (SD card files on hardware, host files in the emulator,
//! in-memory buffers in tests), so that text and settings code can be written
//! and tested without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (editors, settings, playlists)
//!         ↓
//! Line index layer (linebuf crate)
//!         ↓
//! Platform storage (this crate - Store trait)
//!         ↓
//! FAT filesystem / host filesystem / memory
//! ```
//!
//! # Features
//!
//! - `std`: Enable [`storage_local`] and [`mocks`] (host builds and tests)
//! - `defmt`: Enable `defmt::Format` derives on platform types

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::must_use_candidate)] // store accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod mocks;
pub mod storage;
#[cfg(any(test, feature = "std"))]
pub mod storage_local;

pub use storage::{read_up_to, write_all, Offset, Size, Store, StoreError};
