//! Compile-time tuning constants for the line index.
//!
//! These trade RAM footprint against the number of store calls. They are
//! deliberately not runtime options: the buffers they size live on the task
//! stack.

/// Number of newline offsets cached by a wrapper unless a different `N` is
/// chosen (`4 * 64 = 256` bytes of RAM).
pub const DEFAULT_CACHE_SIZE: usize = 64;

/// Size of the stack buffer used for every chunked scan and tail shift.
///
/// Stays at the `large_stack_arrays` threshold so a scan fits comfortably in
/// a 4 KB task stack.
pub const SCAN_CHUNK_SIZE: usize = 512;

/// Lines between two progress reports during the initial scan.
pub const LINE_PROGRESS_INTERVAL: u32 = 100;

/// Progress reports per tail shift (reported every `1 / N` of the tail).
pub const SHIFT_PROGRESS_STEPS: u32 = 8;

/// Text returned by `get_text` when the store fails a read.
pub const READ_ERROR_PLACEHOLDER: &str = "[read error]";
